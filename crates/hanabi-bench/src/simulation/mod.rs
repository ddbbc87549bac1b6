use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hanabi_bot::policy::{HeuristicPolicy, Policy, PolicyContext};
use hanabi_core::game::state::{GameOverReason, GameState, GameStatus, NewGameError};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};

/// Primary entry point for batch simulation runs.
pub struct SimulationRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

/// Result of one full game, as recorded per JSONL row.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub seed: u64,
    pub players: usize,
    pub score: u32,
    pub turns: u32,
    pub outcome: String,
    pub hints_remaining: u8,
    pub mistakes_remaining: u8,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize log row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to set up game: {0:?}")]
    Setup(NewGameError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl SimulationRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute the run, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new();
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome);
            write_game_row(&mut writer, &self.config, game_index, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
        })
    }

    /// Round-robin driver loop: ask for legal actions, let the policy pick,
    /// apply, stop on a terminal status. An empty action list or a policy
    /// that finds nothing useful both end the game.
    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let players = self.config.games.players;
        let mut state = GameState::from_seed(players, game_seed).map_err(RunnerError::Setup)?;
        let mut policy = HeuristicPolicy::with_seed(game_seed);
        let mut current = 0usize;
        let mut turns = 0u32;

        let reason = loop {
            let actions = state.available_actions(current);
            if actions.is_empty() {
                break GameOverReason::NoActionsRemain;
            }

            let ctx = PolicyContext {
                player: current,
                state: &state,
                actions: &actions,
            };
            let Some(action) = policy.choose_action(&ctx) else {
                break GameOverReason::NoActionsRemain;
            };

            if tracing::enabled!(Level::DEBUG) {
                event!(
                    target: "hanabi_bench::turn",
                    Level::DEBUG,
                    game_index = game_index as u64,
                    turn = turns,
                    player = current as u64,
                    action = %action,
                );
            }

            turns += 1;
            if let GameStatus::Over(reason) = state.apply_action(current, &action) {
                break reason;
            }
            current = (current + 1) % players;
        };

        if tracing::enabled!(Level::INFO) {
            event!(
                target: "hanabi_bench::game",
                Level::INFO,
                game_index = game_index as u64,
                seed = game_seed,
                score = state.score(),
                turns,
                outcome = %reason,
            );
        }

        Ok(GameOutcome {
            seed: game_seed,
            players,
            score: state.score(),
            turns,
            outcome: reason.to_string(),
            hints_remaining: state.hints_remaining(),
            mistakes_remaining: state.mistakes_remaining(),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    seed: u64,
    players: usize,
    score: u32,
    turns: u32,
    outcome: String,
    hints_remaining: u8,
    mistakes_remaining: u8,
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: format!("G{game_index:05}"),
        game_index,
        seed: outcome.seed,
        players: outcome.players,
        score: outcome.score,
        turns: outcome.turns,
        outcome: outcome.outcome.clone(),
        hints_remaining: outcome.hints_remaining,
        mistakes_remaining: outcome.mistakes_remaining,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}
