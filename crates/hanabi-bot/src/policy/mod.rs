mod heuristic;

pub use heuristic::HeuristicPolicy;

use hanabi_core::game::action::Action;
use hanabi_core::game::state::GameState;

/// Context provided to policies for decision-making. `actions` is exactly
/// what `available_actions` produced for this player; policies select from
/// it rather than recomputing legality.
pub struct PolicyContext<'a> {
    pub player: usize,
    pub state: &'a GameState,
    pub actions: &'a [Action],
}

/// Unified interface for action selection.
pub trait Policy: Send {
    /// Choose one action, or signal that no useful move exists.
    fn choose_action(&mut self, ctx: &PolicyContext) -> Option<Action>;
}
