use hanabi_core::game::state::GameState;
use hanabi_core::knowledge::{Hint, HintGrid};
use hanabi_core::model::card::{Card, IDENTITY_COUNT};
use hanabi_core::model::hand::HAND_SIZE;

/// Searches for a hint that moves another player towards a certain play or
/// discard. The planner only sees what the acting player legally can: it
/// reads the recipient's true hand, but evaluates the hint's effect with a
/// census excluding both hands.
pub struct HintPlanner;

impl HintPlanner {
    /// Considers other players in turn order, nearest first.
    pub fn choose(state: &GameState, player: usize) -> Option<(usize, Hint)> {
        let num_players = state.num_players();
        for offset in 1..num_players {
            let other = (player + offset) % num_players;
            if let Some(hint) = Self::hint_for(state, player, other) {
                return Some((other, hint));
            }
        }
        None
    }

    fn hint_for(state: &GameState, player: usize, other: usize) -> Option<Hint> {
        let can_play = state.playable_slots(other);
        let can_discard = state.discardable_slots(other);

        let play_needed = needed_hints(state, other, &can_play);
        let discard_needed = needed_hints(state, other, &can_discard);

        // If any actionable slot is already fully resolved, its owner can
        // act without help; spend nothing on this player.
        let needs_help = |slot: &usize| {
            play_needed
                .iter()
                .chain(discard_needed.iter())
                .any(|(_, slots)| slots.contains(slot))
        };
        if can_play
            .iter()
            .chain(can_discard.iter())
            .any(|slot| !needs_help(slot))
        {
            return None;
        }

        // Playable coverage outranks discardable coverage.
        Self::pick(state, player, other, &play_needed, true)
            .or_else(|| Self::pick(state, player, other, &discard_needed, false))
    }

    /// Chooses from one needed-coverage map: the first candidate whose
    /// simulated application newly resolves a slot, else the candidate
    /// covering the most slots (first-found wins ties).
    fn pick(
        state: &GameState,
        player: usize,
        other: usize,
        needed: &[(Hint, Vec<usize>)],
        play: bool,
    ) -> Option<Hint> {
        if needed.is_empty() {
            return None;
        }

        let usable = state.usable_slots(other);
        let census = state.card_census(&[player, other]);

        let resolving = needed.iter().find(|(hint, _)| {
            let updated = simulate_hint(state, other, *hint);
            let resolved = if play {
                state.playable_slots_with(&usable, &updated, &census)
            } else {
                state.discardable_slots_with(&usable, &updated, &census)
            };
            !resolved.is_empty()
        });

        if let Some((hint, _)) = resolving {
            return Some(*hint);
        }

        let mut best: Option<&(Hint, Vec<usize>)> = None;
        for entry in needed {
            match best {
                Some((_, covered)) if entry.1.len() <= covered.len() => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(hint, _)| *hint)
    }
}

/// Hint candidates per actionable slot, keyed by the slot's true colour or
/// value: a slot needs a colour hint while an off-colour identity is still
/// open, and a value hint while an off-value identity is.
fn needed_hints(state: &GameState, other: usize, slots: &[usize]) -> Vec<(Hint, Vec<usize>)> {
    let mut needed: Vec<(Hint, Vec<usize>)> = Vec::new();

    for &slot in slots {
        let card = state.hand(other).slot(slot).expect("actionable slot");
        let grid = state.grid(other, slot);

        for id in 0..IDENTITY_COUNT as u8 {
            let identity = Card::from_id(id).expect("valid identity id");
            if !grid.is_open(identity) {
                continue;
            }
            if identity.colour != card.colour {
                note(&mut needed, Hint::Colour(card.colour), slot);
            }
            if identity.rank != card.rank {
                note(&mut needed, Hint::Value(card.rank), slot);
            }
        }
    }

    needed
}

fn note(needed: &mut Vec<(Hint, Vec<usize>)>, hint: Hint, slot: usize) {
    if let Some((_, slots)) = needed.iter_mut().find(|(seen, _)| *seen == hint) {
        if !slots.contains(&slot) {
            slots.push(slot);
        }
    } else {
        needed.push((hint, vec![slot]));
    }
}

/// The grids the recipient would hold after the hint, using the truthful
/// inclusion set the action generator would name.
fn simulate_hint(state: &GameState, other: usize, hint: Hint) -> [HintGrid; HAND_SIZE] {
    let included: Vec<usize> = state
        .hand(other)
        .iter()
        .filter(|(_, card)| hint.matches(*card))
        .map(|(slot, _)| slot)
        .collect();

    let mut grids = *state.grids(other);
    for (slot, grid) in grids.iter_mut().enumerate() {
        *grid = grid.apply(included.contains(&slot), hint);
    }
    grids
}
