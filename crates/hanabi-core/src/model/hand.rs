use crate::model::card::Card;
use crate::model::deck::Deck;

/// Every hand has exactly five slots regardless of player count.
pub const HAND_SIZE: usize = 5;

/// Fixed slots; a slot goes empty when its card is removed and the deck
/// cannot supply a replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    slots: [Option<Card>; HAND_SIZE],
}

impl Hand {
    pub fn new() -> Self {
        Self {
            slots: [None; HAND_SIZE],
        }
    }

    pub fn with_cards(cards: [Option<Card>; HAND_SIZE]) -> Self {
        Self { slots: cards }
    }

    /// Fills every slot by drawing from the deck.
    pub fn deal_from(deck: &mut Deck) -> Self {
        let mut hand = Self::new();
        for slot in 0..HAND_SIZE {
            hand.slots[slot] = deck.draw();
        }
        hand
    }

    pub fn slot(&self, index: usize) -> Option<Card> {
        self.slots[index]
    }

    pub fn take(&mut self, index: usize) -> Option<Card> {
        self.slots[index].take()
    }

    pub fn place(&mut self, index: usize, card: Card) {
        debug_assert!(self.slots[index].is_none(), "slot must be empty");
        self.slots[index] = Some(card);
    }

    /// Indices of slots still holding a card.
    pub fn usable_slots(&self) -> Vec<usize> {
        (0..HAND_SIZE).filter(|&i| self.slots[i].is_some()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Card)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|card| (i, card)))
    }
}

#[cfg(test)]
mod tests {
    use super::{HAND_SIZE, Hand};
    use crate::model::card::Card;
    use crate::model::colour::Colour;
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;

    #[test]
    fn deal_fills_every_slot() {
        let mut deck = Deck::standard();
        let hand = Hand::deal_from(&mut deck);
        assert_eq!(hand.len(), HAND_SIZE);
        assert_eq!(deck.len(), 45);
        assert_eq!(hand.usable_slots(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn take_leaves_slot_empty_until_placed() {
        let mut deck = Deck::standard();
        let mut hand = Hand::deal_from(&mut deck);

        let card = hand.take(2).expect("slot 2 dealt");
        assert_eq!(hand.slot(2), None);
        assert_eq!(hand.usable_slots(), vec![0, 1, 3, 4]);

        hand.place(2, card);
        assert_eq!(hand.slot(2), Some(card));
    }

    #[test]
    fn iter_yields_occupied_slots_in_order() {
        let card = Card::new(Colour::Green, Rank::Four);
        let hand = Hand::with_cards([None, Some(card), None, None, Some(card)]);
        let occupied: Vec<_> = hand.iter().collect();
        assert_eq!(occupied, vec![(1, card), (4, card)]);
    }
}
