use crate::model::card::Card;
use crate::model::colour::Colour;
use crate::model::rank::Rank;

pub const MAX_STACK_HEIGHT: u8 = 5;

/// Highest rank played per colour; 0 while a colour's stack is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Table {
    stacks: [u8; 5],
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self, colour: Colour) -> u8 {
        self.stacks[colour.index()]
    }

    /// A card advances its colour's stack iff it is the next rank up.
    pub fn accepts(&self, card: Card) -> bool {
        self.top(card.colour) + 1 == card.rank.value()
    }

    /// Whether a card of this identity is already part of a stack.
    pub fn contains(&self, card: Card) -> bool {
        card.rank.value() <= self.top(card.colour)
    }

    pub fn advance(&mut self, colour: Colour) {
        debug_assert!(self.stacks[colour.index()] < MAX_STACK_HEIGHT);
        self.stacks[colour.index()] += 1;
    }

    pub fn score(&self) -> u32 {
        self.stacks.iter().map(|&top| top as u32).sum()
    }

    /// Identities that would currently advance a stack: at most one per
    /// colour, none for completed colours.
    pub fn required_cards(&self) -> Vec<Card> {
        let mut required = Vec::with_capacity(5);
        for colour in Colour::ALL.iter().copied() {
            let top = self.top(colour);
            if top < MAX_STACK_HEIGHT {
                let rank = Rank::from_value(top + 1).expect("stack top below five");
                required.push(Card::new(colour, rank));
            }
        }
        required
    }
}
