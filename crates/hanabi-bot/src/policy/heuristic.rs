use super::{Policy, PolicyContext};
use crate::bot::HintPlanner;
use hanabi_core::game::action::Action;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{Level, event};

/// Single-perspective heuristic: certain plays, then certain discards,
/// then a forced random move when no hint tokens remain, then the hint
/// search. Never reads the acting player's own cards.
pub struct HeuristicPolicy {
    rng: StdRng,
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Deterministic policy: the rng only fires on the forced-move branch.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for HeuristicPolicy {
    fn choose_action(&mut self, ctx: &PolicyContext) -> Option<Action> {
        let state = ctx.state;
        let player = ctx.player;
        let census = state.card_census(&[player]);

        // Lowest certain slot wins; slot order is the tie-break.
        if let Some(&slot) = state.playable_slots_from_hints(player, &census).first() {
            let action = Action::Play { slot };
            log_decision(ctx, &action, "certain_play");
            return Some(action);
        }

        if let Some(&slot) = state.discardable_slots_from_hints(player, &census).first() {
            let action = Action::Discard { slot };
            log_decision(ctx, &action, "certain_discard");
            return Some(action);
        }

        if state.hints_remaining() == 0 {
            // Nothing is certain and no hint can be given: forced move.
            let action = ctx.actions[self.rng.gen_range(0..ctx.actions.len())].clone();
            log_decision(ctx, &action, "forced_random");
            return Some(action);
        }

        if let Some((target, hint)) = HintPlanner::choose(state, player) {
            let action = ctx
                .actions
                .iter()
                .find(|action| {
                    matches!(
                        action,
                        Action::Hint { target: t, hint: h, .. } if *t == target && *h == hint
                    )
                })
                .cloned()
                .expect("planned hint is a legal action");
            log_decision(ctx, &action, "planned_hint");
            return Some(action);
        }

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "hanabi_bot::decide",
                Level::DEBUG,
                player = player as u64,
                hints_remaining = state.hints_remaining(),
                reason = "no_useful_move",
            );
        }
        None
    }
}

fn log_decision(ctx: &PolicyContext, action: &Action, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "hanabi_bot::decide",
        Level::DEBUG,
        player = ctx.player as u64,
        hints_remaining = ctx.state.hints_remaining(),
        mistakes_remaining = ctx.state.mistakes_remaining(),
        score = ctx.state.score(),
        action = %action,
        reason,
    );
}
