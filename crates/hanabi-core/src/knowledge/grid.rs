use crate::knowledge::census::CardCensus;
use crate::model::card::{Card, IDENTITY_COUNT};
use crate::model::colour::Colour;
use crate::model::rank::Rank;
use core::fmt;

/// One dimension of a hint: every matching card in the target hand is
/// pointed at, and every non-matching card is implicitly ruled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hint {
    Colour(Colour),
    Value(Rank),
}

impl Hint {
    pub fn matches(self, card: Card) -> bool {
        match self {
            Hint::Colour(colour) => card.colour == colour,
            Hint::Value(rank) => card.rank == rank,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Colour(colour) => write!(f, "colour {}", colour.as_str()),
            Hint::Value(rank) => write!(f, "value {rank}"),
        }
    }
}

/// Possibility flags for one hand slot, one per identity. Flags only move
/// from open to excluded until the slot's card is replaced and the grid
/// resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintGrid {
    open: [bool; IDENTITY_COUNT],
}

impl Default for HintGrid {
    fn default() -> Self {
        Self::all_open()
    }
}

impl HintGrid {
    /// The state of a freshly drawn, unhinted card.
    pub const fn all_open() -> Self {
        Self {
            open: [true; IDENTITY_COUNT],
        }
    }

    pub fn is_open(&self, card: Card) -> bool {
        self.open[card.to_id() as usize]
    }

    pub fn open_count(&self) -> usize {
        self.open.iter().filter(|&&flag| flag).count()
    }

    /// Applies one hint to this slot, returning the narrowed grid.
    ///
    /// An identity survives iff whether it matches the hint agrees with
    /// whether the slot was pointed at: an included slot sheds every
    /// non-matching identity, an excluded slot sheds every matching one.
    pub fn apply(&self, included: bool, hint: Hint) -> HintGrid {
        let mut next = *self;
        for id in 0..IDENTITY_COUNT as u8 {
            let card = Card::from_id(id).expect("valid identity id");
            if hint.matches(card) != included {
                next.open[id as usize] = false;
            }
        }
        next
    }

    /// Identities still consistent with every hint received plus the
    /// given census: open, and not fully accounted for elsewhere.
    pub fn possible_cards<'a>(
        &'a self,
        census: &'a CardCensus,
    ) -> impl Iterator<Item = Card> + 'a {
        (0..IDENTITY_COUNT as u8).filter_map(move |id| {
            let card = Card::from_id(id).expect("valid identity id");
            (self.open[id as usize] && census.copies_unaccounted(card) > 0).then_some(card)
        })
    }
}
