use crate::knowledge::Hint;
use core::fmt;

/// One player move. Hint actions always name every slot in the target hand
/// matching the hinted colour or value; partial hints are not legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Discard {
        slot: usize,
    },
    Play {
        slot: usize,
    },
    Hint {
        target: usize,
        slots: Vec<usize>,
        hint: Hint,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Discard { slot } => write!(f, "discard slot {slot}"),
            Action::Play { slot } => write!(f, "play slot {slot}"),
            Action::Hint {
                target,
                slots,
                hint,
            } => write!(f, "hint player {target}: {hint} at slots {slots:?}"),
        }
    }
}
