use crate::game::action::Action;
use crate::knowledge::{CardCensus, Hint, HintGrid};
use crate::model::card::Card;
use crate::model::colour::Colour;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::discard::DiscardPile;
use crate::model::hand::{HAND_SIZE, Hand};
use crate::model::rank::Rank;
use crate::model::table::Table;
use core::fmt;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 5;
pub const MAX_HINT_TOKENS: u8 = 8;
pub const STARTING_MISTAKE_TOKENS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOverReason {
    LastCopyDiscarded(Card),
    OutOfMistakes,
    NoActionsRemain,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::LastCopyDiscarded(card) => {
                write!(f, "the last copy of {card} was discarded")
            }
            GameOverReason::OutOfMistakes => f.write_str("ran out of mistake tokens"),
            GameOverReason::NoActionsRemain => f.write_str("no legal actions remain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Over(GameOverReason),
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Over(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewGameError {
    PlayerCount(usize),
    DeckSize(usize),
}

/// Whole-game state: deck, hands, discard pile, table, token counters, and
/// every player's hint grids, indexed (player, slot).
#[derive(Debug, Clone)]
pub struct GameState {
    num_players: usize,
    deck: Deck,
    hands: Vec<Hand>,
    discard_pile: DiscardPile,
    table: Table,
    hints_remaining: u8,
    mistakes_remaining: u8,
    grids: Vec<[HintGrid; HAND_SIZE]>,
    status: GameStatus,
}

impl GameState {
    /// Deals one hand per player from a full, pre-shuffled deck.
    pub fn new(num_players: usize, mut deck: Deck) -> Result<Self, NewGameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(NewGameError::PlayerCount(num_players));
        }
        if deck.len() != DECK_SIZE {
            return Err(NewGameError::DeckSize(deck.len()));
        }

        let hands = (0..num_players)
            .map(|_| Hand::deal_from(&mut deck))
            .collect();
        Ok(Self::assemble(num_players, deck, hands))
    }

    pub fn from_seed(num_players: usize, seed: u64) -> Result<Self, NewGameError> {
        Self::new(num_players, Deck::shuffled_with_seed(seed))
    }

    /// Builds a game from concrete hands and whatever deck remains. Used by
    /// bots and tests that need a known arrangement.
    pub fn from_hands(hands: Vec<Hand>, deck: Deck) -> Result<Self, NewGameError> {
        let num_players = hands.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(NewGameError::PlayerCount(num_players));
        }
        Ok(Self::assemble(num_players, deck, hands))
    }

    fn assemble(num_players: usize, deck: Deck, hands: Vec<Hand>) -> Self {
        Self {
            num_players,
            deck,
            hands,
            discard_pile: DiscardPile::new(),
            table: Table::new(),
            hints_remaining: MAX_HINT_TOKENS,
            mistakes_remaining: STARTING_MISTAKE_TOKENS,
            grids: vec![[HintGrid::all_open(); HAND_SIZE]; num_players],
            status: GameStatus::InProgress,
        }
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn hints_remaining(&self) -> u8 {
        self.hints_remaining
    }

    pub fn mistakes_remaining(&self) -> u8 {
        self.mistakes_remaining
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn discard_pile(&self) -> &DiscardPile {
        &self.discard_pile
    }

    pub fn hand(&self, player: usize) -> &Hand {
        &self.hands[player]
    }

    pub fn grids(&self, player: usize) -> &[HintGrid; HAND_SIZE] {
        &self.grids[player]
    }

    pub fn grid(&self, player: usize, slot: usize) -> &HintGrid {
        &self.grids[player][slot]
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn score(&self) -> u32 {
        self.table.score()
    }

    pub fn usable_slots(&self, player: usize) -> Vec<usize> {
        self.hands[player].usable_slots()
    }

    pub fn required_cards(&self) -> Vec<Card> {
        self.table.required_cards()
    }

    /// Every legal action for `player`: one discard and one play per
    /// occupied slot, plus (while hint tokens last) one maximal, truthful
    /// hint per colour and per value present in each other player's hand.
    pub fn available_actions(&self, player: usize) -> Vec<Action> {
        let mut actions = Vec::new();

        for slot in self.hands[player].usable_slots() {
            actions.push(Action::Discard { slot });
        }
        for slot in self.hands[player].usable_slots() {
            actions.push(Action::Play { slot });
        }

        if self.hints_remaining > 0 {
            for target in 0..self.num_players {
                if target == player {
                    continue;
                }
                let hand = &self.hands[target];

                for colour in Colour::ALL.iter().copied() {
                    let slots: Vec<usize> = hand
                        .iter()
                        .filter(|(_, card)| card.colour == colour)
                        .map(|(slot, _)| slot)
                        .collect();
                    if !slots.is_empty() {
                        actions.push(Action::Hint {
                            target,
                            slots,
                            hint: Hint::Colour(colour),
                        });
                    }
                }

                for rank in Rank::ORDERED.iter().copied() {
                    let slots: Vec<usize> = hand
                        .iter()
                        .filter(|(_, card)| card.rank == rank)
                        .map(|(slot, _)| slot)
                        .collect();
                    if !slots.is_empty() {
                        actions.push(Action::Hint {
                            target,
                            slots,
                            hint: Hint::Value(rank),
                        });
                    }
                }
            }
        }

        actions
    }

    /// Copies accounted for from a perspective that cannot see the hands in
    /// `exclude`: discard pile, played stacks, and every other hand.
    pub fn card_census(&self, exclude: &[usize]) -> CardCensus {
        let mut census = CardCensus::new();

        for &card in self.discard_pile.cards() {
            census.note(card);
        }

        for colour in Colour::ALL.iter().copied() {
            for value in 1..=self.table.top(colour) {
                let rank = Rank::from_value(value).expect("stack top in range");
                census.note(Card::new(colour, rank));
            }
        }

        for (player, hand) in self.hands.iter().enumerate() {
            if exclude.contains(&player) {
                continue;
            }
            for (_, card) in hand.iter() {
                census.note(card);
            }
        }

        census
    }

    fn copies_undiscarded(&self, card: Card) -> u8 {
        card.rank.copies().saturating_sub(self.discard_pile.count(card))
    }

    pub fn cards_remaining_of(&self, card: Card) -> bool {
        self.copies_undiscarded(card) > 0
    }

    /// Losing one copy of an expendable identity cannot strand the game:
    /// either it is already on the table or at least one spare copy exists.
    fn is_expendable(&self, card: Card) -> bool {
        self.table.contains(card) || self.copies_undiscarded(card) > 1
    }

    /// Slots whose hint-and-census possibility set lies entirely inside the
    /// required set. An empty possibility set is vacuously certain.
    pub fn playable_slots_with(
        &self,
        usable: &[usize],
        grids: &[HintGrid; HAND_SIZE],
        census: &CardCensus,
    ) -> Vec<usize> {
        let required = self.table.required_cards();
        certain_slots(
            usable,
            |slot| grids[slot].possible_cards(census).collect(),
            |card| required.contains(&card),
        )
    }

    /// Slots whose every possible identity is expendable.
    pub fn discardable_slots_with(
        &self,
        usable: &[usize],
        grids: &[HintGrid; HAND_SIZE],
        census: &CardCensus,
    ) -> Vec<usize> {
        certain_slots(
            usable,
            |slot| grids[slot].possible_cards(census).collect(),
            |card| self.is_expendable(card),
        )
    }

    pub fn playable_slots_from_hints(&self, player: usize, census: &CardCensus) -> Vec<usize> {
        self.playable_slots_with(&self.usable_slots(player), &self.grids[player], census)
    }

    pub fn discardable_slots_from_hints(&self, player: usize, census: &CardCensus) -> Vec<usize> {
        self.discardable_slots_with(&self.usable_slots(player), &self.grids[player], census)
    }

    /// Ground-truth variant of the same predicate, for reasoning about a
    /// hand the caller can actually see.
    pub fn playable_slots(&self, player: usize) -> Vec<usize> {
        let required = self.table.required_cards();
        certain_slots(
            &self.usable_slots(player),
            |slot| vec![self.hands[player].slot(slot).expect("usable slot")],
            |card| required.contains(&card),
        )
    }

    pub fn discardable_slots(&self, player: usize) -> Vec<usize> {
        certain_slots(
            &self.usable_slots(player),
            |slot| vec![self.hands[player].slot(slot).expect("usable slot")],
            |card| self.is_expendable(card),
        )
    }

    /// Applies one action drawn from `available_actions(player)` and reports
    /// the resulting status. Termination is a returned variant, never a
    /// panic; applying an action the generator would not have offered is a
    /// caller contract violation.
    pub fn apply_action(&mut self, player: usize, action: &Action) -> GameStatus {
        debug_assert!(!self.status.is_over(), "action applied after game over");

        match action {
            Action::Discard { slot } => {
                let card = self.hands[player]
                    .take(*slot)
                    .expect("discard from an occupied slot");
                self.grids[player][*slot] = HintGrid::all_open();

                if self.route_to_discard(card) {
                    return self.status.clone();
                }

                self.hints_remaining = (self.hints_remaining + 1).min(MAX_HINT_TOKENS);
                self.refill(player, *slot);
            }
            Action::Play { slot } => {
                let card = self.hands[player]
                    .take(*slot)
                    .expect("play from an occupied slot");
                self.grids[player][*slot] = HintGrid::all_open();

                if self.table.accepts(card) {
                    self.table.advance(card.colour);
                } else {
                    self.mistakes_remaining -= 1;
                    if self.route_to_discard(card) {
                        return self.status.clone();
                    }
                    if self.mistakes_remaining == 0 {
                        self.status = GameStatus::Over(GameOverReason::OutOfMistakes);
                        return self.status.clone();
                    }
                }

                self.refill(player, *slot);
            }
            Action::Hint {
                target,
                slots,
                hint,
            } => {
                debug_assert!(self.hints_remaining > 0, "hint given without tokens");
                debug_assert!(*target != player, "players cannot hint themselves");
                self.hints_remaining -= 1;

                for slot in 0..HAND_SIZE {
                    let included = slots.contains(&slot);
                    self.grids[*target][slot] = self.grids[*target][slot].apply(included, *hint);
                }
            }
        }

        self.status.clone()
    }

    /// Common resolution for discards and misplays. Returns true when the
    /// game just ended because the identity is unrecoverable.
    fn route_to_discard(&mut self, card: Card) -> bool {
        self.discard_pile.add(card);
        if !self.table.contains(card) && !self.cards_remaining_of(card) {
            self.status = GameStatus::Over(GameOverReason::LastCopyDiscarded(card));
            return true;
        }
        false
    }

    fn refill(&mut self, player: usize, slot: usize) {
        if let Some(card) = self.deck.draw() {
            self.hands[player].place(slot, card);
        }
    }
}

fn certain_slots<F, P>(usable: &[usize], mut possible: F, pred: P) -> Vec<usize>
where
    F: FnMut(usize) -> Vec<Card>,
    P: Fn(Card) -> bool,
{
    usable
        .iter()
        .copied()
        .filter(|&slot| possible(slot).into_iter().all(&pred))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        GameOverReason, GameState, GameStatus, MAX_HINT_TOKENS, NewGameError,
        STARTING_MISTAKE_TOKENS,
    };
    use crate::game::action::Action;
    use crate::knowledge::{Hint, HintGrid};
    use crate::model::card::Card;
    use crate::model::colour::Colour;
    use crate::model::deck::Deck;
    use crate::model::hand::{HAND_SIZE, Hand};
    use crate::model::rank::Rank;

    fn card(colour: Colour, rank: Rank) -> Card {
        Card::new(colour, rank)
    }

    fn full_hand(cards: [Card; HAND_SIZE]) -> Hand {
        Hand::with_cards(cards.map(Some))
    }

    fn empty_deck() -> Deck {
        let mut deck = Deck::standard();
        while deck.draw().is_some() {}
        deck
    }

    /// Three players holding fives, fours and threes: nothing gets played
    /// or resolved by accident.
    fn quiet_state() -> GameState {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::Five),
                card(Colour::Yellow, Rank::Five),
                card(Colour::Green, Rank::Five),
                card(Colour::Blue, Rank::Five),
                card(Colour::White, Rank::Five),
            ]),
            full_hand([
                card(Colour::Red, Rank::Four),
                card(Colour::Yellow, Rank::Four),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
            full_hand([
                card(Colour::Red, Rank::Three),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
            ]),
        ];
        GameState::from_hands(hands, empty_deck()).unwrap()
    }

    #[test]
    fn new_game_deals_and_opens_all_grids() {
        let state = GameState::from_seed(5, 7).unwrap();

        assert_eq!(state.num_players(), 5);
        assert_eq!(state.deck_remaining(), 25);
        assert_eq!(state.hints_remaining(), MAX_HINT_TOKENS);
        assert_eq!(state.mistakes_remaining(), STARTING_MISTAKE_TOKENS);
        assert_eq!(state.score(), 0);
        assert_eq!(*state.status(), GameStatus::InProgress);

        for player in 0..5 {
            assert_eq!(state.hand(player).len(), HAND_SIZE);
            for slot in 0..HAND_SIZE {
                assert_eq!(state.grid(player, slot).open_count(), 25);
            }
        }
    }

    #[test]
    fn player_count_is_validated() {
        assert!(matches!(
            GameState::new(2, Deck::standard()),
            Err(NewGameError::PlayerCount(2))
        ));
        assert!(matches!(
            GameState::new(6, Deck::standard()),
            Err(NewGameError::PlayerCount(6))
        ));
        assert!(matches!(
            GameState::new(4, empty_deck()),
            Err(NewGameError::DeckSize(0))
        ));
    }

    #[test]
    fn available_actions_cover_slots_and_other_players_only() {
        let state = quiet_state();
        let actions = state.available_actions(0);

        let discards = actions
            .iter()
            .filter(|a| matches!(a, Action::Discard { .. }))
            .count();
        let plays = actions
            .iter()
            .filter(|a| matches!(a, Action::Play { .. }))
            .count();
        assert_eq!(discards, HAND_SIZE);
        assert_eq!(plays, HAND_SIZE);

        for action in &actions {
            if let Action::Hint { target, .. } = action {
                assert_ne!(*target, 0, "no self hints");
            }
        }

        // Each other hand: five distinct colours plus one shared value.
        let hints_to_1 = actions
            .iter()
            .filter(|a| matches!(a, Action::Hint { target: 1, .. }))
            .count();
        assert_eq!(hints_to_1, 6);
    }

    #[test]
    fn hint_actions_name_every_matching_slot() {
        let state = quiet_state();
        let actions = state.available_actions(0);

        let value_hint = actions
            .iter()
            .find(|a| {
                matches!(
                    a,
                    Action::Hint {
                        target: 1,
                        hint: Hint::Value(Rank::Four),
                        ..
                    }
                )
            })
            .expect("value hint offered");
        if let Action::Hint { slots, .. } = value_hint {
            assert_eq!(slots, &vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn no_hint_actions_without_tokens() {
        let mut state = quiet_state();
        // Burn all eight tokens with legal hints back and forth.
        for _ in 0..4 {
            state.apply_action(
                0,
                &Action::Hint {
                    target: 1,
                    slots: vec![0, 1, 2, 3, 4],
                    hint: Hint::Value(Rank::Four),
                },
            );
            state.apply_action(
                1,
                &Action::Hint {
                    target: 0,
                    slots: vec![0, 1, 2, 3, 4],
                    hint: Hint::Value(Rank::Five),
                },
            );
        }
        assert_eq!(state.hints_remaining(), 0);

        let actions = state.available_actions(2);
        assert!(actions.iter().all(|a| !matches!(a, Action::Hint { .. })));
        assert_eq!(actions.len(), 2 * HAND_SIZE);
    }

    #[test]
    fn colour_hint_touches_exactly_its_slice() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Blue, Rank::Two),
                card(Colour::Red, Rank::Three),
                card(Colour::Green, Rank::Four),
                card(Colour::White, Rank::Five),
            ]),
            full_hand([
                card(Colour::Yellow, Rank::One),
                card(Colour::Yellow, Rank::Two),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Yellow, Rank::Four),
                card(Colour::Green, Rank::Five),
            ]),
            full_hand([
                card(Colour::Blue, Rank::One),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::One),
                card(Colour::White, Rank::Two),
                card(Colour::Green, Rank::One),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();

        state.apply_action(
            1,
            &Action::Hint {
                target: 0,
                slots: vec![0, 2],
                hint: Hint::Colour(Colour::Red),
            },
        );

        for slot in [0, 2] {
            let grid = state.grid(0, slot);
            for rank in Rank::ORDERED {
                assert!(grid.is_open(card(Colour::Red, rank)), "red stays open");
                assert!(!grid.is_open(card(Colour::Blue, rank)), "others close");
            }
            // A colour hint never narrows rank-wise within the colour.
            assert_eq!(grid.open_count(), 5);
        }

        for slot in [1, 3, 4] {
            let grid = state.grid(0, slot);
            for rank in Rank::ORDERED {
                assert!(!grid.is_open(card(Colour::Red, rank)), "red closes");
            }
            assert_eq!(grid.open_count(), 20);
        }

        // Untouched player.
        for slot in 0..HAND_SIZE {
            assert_eq!(state.grid(1, slot).open_count(), 25);
        }
    }

    #[test]
    fn discard_refunds_a_token_capped_at_eight() {
        let mut state = quiet_state();
        assert_eq!(state.hints_remaining(), MAX_HINT_TOKENS);

        // Discarding a three leaves a spare copy, so play continues.
        let status = state.apply_action(2, &Action::Discard { slot: 0 });
        assert_eq!(status, GameStatus::InProgress);
        assert_eq!(state.hints_remaining(), MAX_HINT_TOKENS);

        state.apply_action(
            0,
            &Action::Hint {
                target: 1,
                slots: vec![0, 1, 2, 3, 4],
                hint: Hint::Value(Rank::Four),
            },
        );
        assert_eq!(state.hints_remaining(), MAX_HINT_TOKENS - 1);

        state.apply_action(2, &Action::Discard { slot: 1 });
        assert_eq!(state.hints_remaining(), MAX_HINT_TOKENS);
    }

    #[test]
    fn discard_resets_grid_and_draws_replacement() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::One),
                card(Colour::Green, Rank::One),
                card(Colour::Blue, Rank::One),
                card(Colour::White, Rank::One),
            ]),
            full_hand([
                card(Colour::Red, Rank::Two),
                card(Colour::Yellow, Rank::Two),
                card(Colour::Green, Rank::Two),
                card(Colour::Blue, Rank::Two),
                card(Colour::White, Rank::Two),
            ]),
            full_hand([
                card(Colour::Red, Rank::Three),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
            ]),
        ];
        let mut state = GameState::from_hands(hands, Deck::standard()).unwrap();

        state.apply_action(
            1,
            &Action::Hint {
                target: 0,
                slots: vec![0, 1, 2, 3, 4],
                hint: Hint::Value(Rank::One),
            },
        );
        assert!(state.grid(0, 0).open_count() < 25);

        let deck_before = state.deck_remaining();
        state.apply_action(0, &Action::Discard { slot: 0 });

        assert_eq!(state.grid(0, 0).open_count(), 25);
        assert_eq!(state.hand(0).len(), HAND_SIZE);
        assert_eq!(state.deck_remaining(), deck_before - 1);
        assert_eq!(state.discard_pile().len(), 1);
    }

    #[test]
    fn playing_the_next_rank_advances_the_table() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Red, Rank::Two),
                card(Colour::Yellow, Rank::Five),
                card(Colour::Green, Rank::Five),
                card(Colour::Blue, Rank::Five),
            ]),
            full_hand([
                card(Colour::Yellow, Rank::Four),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
            full_hand([
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
                card(Colour::White, Rank::Two),
                card(Colour::Green, Rank::Two),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();

        let status = state.apply_action(0, &Action::Play { slot: 0 });
        assert_eq!(status, GameStatus::InProgress);
        assert_eq!(state.table().top(Colour::Red), 1);
        assert_eq!(state.score(), 1);
        assert!(state.discard_pile().is_empty());

        let status = state.apply_action(0, &Action::Play { slot: 1 });
        assert_eq!(status, GameStatus::InProgress);
        assert_eq!(state.table().top(Colour::Red), 2);
        // Deck is empty: both slots stay vacant.
        assert_eq!(state.usable_slots(0), vec![2, 3, 4]);
    }

    #[test]
    fn misplay_spends_a_mistake_and_lands_in_the_discard() {
        let mut state = quiet_state();

        // A five on an empty table is a misplay; the lone copy ends the
        // game as unrecoverable before mistakes run out.
        let status = state.apply_action(0, &Action::Play { slot: 0 });
        assert_eq!(state.mistakes_remaining(), STARTING_MISTAKE_TOKENS - 1);
        assert_eq!(
            status,
            GameStatus::Over(GameOverReason::LastCopyDiscarded(card(
                Colour::Red,
                Rank::Five
            )))
        );
        assert_eq!(state.discard_pile().len(), 1);
    }

    #[test]
    fn three_misplays_exhaust_the_mistake_tokens() {
        let mut state = quiet_state();

        // Threes have two copies each, so no misplay strands an identity.
        let status = state.apply_action(2, &Action::Play { slot: 0 });
        assert_eq!(status, GameStatus::InProgress);
        let status = state.apply_action(2, &Action::Play { slot: 1 });
        assert_eq!(status, GameStatus::InProgress);
        assert_eq!(state.mistakes_remaining(), 1);

        let status = state.apply_action(2, &Action::Play { slot: 2 });
        assert_eq!(status, GameStatus::Over(GameOverReason::OutOfMistakes));
        assert!(state.status().is_over());
        assert_eq!(state.discard_pile().len(), 3);
    }

    #[test]
    fn discarding_the_last_copy_of_an_unplayed_card_ends_the_game() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Two),
                card(Colour::Green, Rank::Two),
                card(Colour::Blue, Rank::Two),
                card(Colour::White, Rank::Two),
            ]),
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
            ]),
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Four),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();

        assert_eq!(
            state.apply_action(0, &Action::Discard { slot: 0 }),
            GameStatus::InProgress
        );
        assert_eq!(
            state.apply_action(1, &Action::Discard { slot: 0 }),
            GameStatus::InProgress
        );

        // Table red is still 0; this was the last red one anywhere.
        let status = state.apply_action(2, &Action::Discard { slot: 0 });
        assert_eq!(
            status,
            GameStatus::Over(GameOverReason::LastCopyDiscarded(card(
                Colour::Red,
                Rank::One
            )))
        );
    }

    #[test]
    fn census_counts_discards_table_and_unexcluded_hands() {
        let mut state = quiet_state();
        state.apply_action(2, &Action::Discard { slot: 0 });

        let census = state.card_census(&[0]);
        // Player 0's fives are invisible to themselves.
        assert_eq!(census.count(card(Colour::Red, Rank::Five)), 0);
        // Player 1's fours and player 2's remaining threes are visible.
        assert_eq!(census.count(card(Colour::Yellow, Rank::Four)), 1);
        assert_eq!(census.count(card(Colour::Yellow, Rank::Three)), 1);
        // The discarded red three is public.
        assert_eq!(census.count(card(Colour::Red, Rank::Three)), 1);

        let census_both = state.card_census(&[0, 1]);
        assert_eq!(census_both.count(card(Colour::Yellow, Rank::Four)), 0);
    }

    #[test]
    fn census_includes_played_stacks() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Red, Rank::Two),
                card(Colour::Yellow, Rank::Five),
                card(Colour::Green, Rank::Five),
                card(Colour::Blue, Rank::Five),
            ]),
            full_hand([
                card(Colour::Yellow, Rank::Four),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
            full_hand([
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
                card(Colour::White, Rank::Two),
                card(Colour::Green, Rank::Two),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();
        state.apply_action(0, &Action::Play { slot: 0 });
        state.apply_action(0, &Action::Play { slot: 1 });

        let census = state.card_census(&[0, 1, 2]);
        assert_eq!(census.count(card(Colour::Red, Rank::One)), 1);
        assert_eq!(census.count(card(Colour::Red, Rank::Two)), 1);
        assert_eq!(census.count(card(Colour::Red, Rank::Three)), 0);
    }

    #[test]
    fn hints_make_a_slot_certainly_playable() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Two),
                card(Colour::Green, Rank::Two),
                card(Colour::Blue, Rank::Two),
                card(Colour::White, Rank::Two),
            ]),
            full_hand([
                card(Colour::Yellow, Rank::Four),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
            full_hand([
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
                card(Colour::White, Rank::One),
                card(Colour::Green, Rank::One),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();

        let census = state.card_census(&[0]);
        assert!(state.playable_slots_from_hints(0, &census).is_empty());

        // "Your slot 0 is a one" — every one is currently required.
        state.apply_action(
            1,
            &Action::Hint {
                target: 0,
                slots: vec![0],
                hint: Hint::Value(Rank::One),
            },
        );
        let census = state.card_census(&[0]);
        assert_eq!(state.playable_slots_from_hints(0, &census), vec![0]);

        // Ground truth agrees.
        assert_eq!(state.playable_slots(0), vec![0]);
    }

    #[test]
    fn elimination_alone_can_resolve_a_slot() {
        // Player 0 holds the third red one; the other two are discarded,
        // and a value hint narrows the slot to "a one". With reds one
        // short everywhere else, only identities with surviving copies
        // remain possible.
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Two),
                card(Colour::Green, Rank::Two),
                card(Colour::Blue, Rank::Two),
                card(Colour::White, Rank::Two),
            ]),
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
            ]),
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Four),
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();
        state.apply_action(1, &Action::Discard { slot: 0 });
        state.apply_action(
            1,
            &Action::Hint {
                target: 0,
                slots: vec![0],
                hint: Hint::Value(Rank::One),
            },
        );

        let census = state.card_census(&[0]);
        let possible: Vec<_> = state.grid(0, 0).possible_cards(&census).collect();
        // All five ones remain open in the grid, and none is fully
        // accounted for from player 0's perspective.
        assert_eq!(possible.len(), 5);

        // Once the remaining visible red one is also discarded, the red
        // one is down to the single copy player 0 is holding.
        state.apply_action(2, &Action::Discard { slot: 0 });
        let census = state.card_census(&[0]);
        let possible: Vec<_> = state.grid(0, 0).possible_cards(&census).collect();
        assert!(possible.contains(&card(Colour::Red, Rank::One)));
    }

    #[test]
    fn discard_certainty_follows_the_expendable_predicate() {
        let hands = vec![
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Red, Rank::Two),
                card(Colour::Yellow, Rank::Five),
                card(Colour::Green, Rank::Five),
                card(Colour::Blue, Rank::Five),
            ]),
            full_hand([
                card(Colour::Red, Rank::One),
                card(Colour::Yellow, Rank::Three),
                card(Colour::Green, Rank::Three),
                card(Colour::Blue, Rank::Three),
                card(Colour::White, Rank::Three),
            ]),
            full_hand([
                card(Colour::Green, Rank::Four),
                card(Colour::Blue, Rank::Four),
                card(Colour::White, Rank::Four),
                card(Colour::White, Rank::Two),
                card(Colour::Green, Rank::Two),
            ]),
        ];
        let mut state = GameState::from_hands(hands, empty_deck()).unwrap();

        // Red one reaches the table; player 1's copy becomes expendable.
        state.apply_action(0, &Action::Play { slot: 0 });
        assert!(state.discardable_slots(1).contains(&0));

        // Narrow player 1's slot 0 down to the red one.
        state.apply_action(
            0,
            &Action::Hint {
                target: 1,
                slots: vec![0],
                hint: Hint::Colour(Colour::Red),
            },
        );
        state.apply_action(
            0,
            &Action::Hint {
                target: 1,
                slots: vec![0],
                hint: Hint::Value(Rank::One),
            },
        );

        let census = state.card_census(&[1]);
        assert_eq!(state.discardable_slots_from_hints(1, &census), vec![0]);
        // It is on the table already, so it is not certainly playable.
        assert!(state.playable_slots_from_hints(1, &census).is_empty());
    }

    #[test]
    fn empty_possibility_set_is_vacuously_certain() {
        let state = quiet_state();
        let grids = [HintGrid::all_open()
            .apply(true, Hint::Colour(Colour::Red))
            .apply(true, Hint::Value(Rank::One)); HAND_SIZE];

        let mut census = crate::knowledge::CardCensus::new();
        for _ in 0..3 {
            census.note(card(Colour::Red, Rank::One));
        }

        // Every copy of the only open identity is accounted for: the
        // possibility set is empty, which counts as certain for both.
        assert_eq!(
            state.playable_slots_with(&[0], &grids, &census),
            vec![0]
        );
        assert_eq!(
            state.discardable_slots_with(&[0], &grids, &census),
            vec![0]
        );
    }
}
