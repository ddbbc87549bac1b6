use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::simulation::GameOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI
const MAX_SCORE: usize = 25;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

#[derive(Debug, Default)]
pub struct AnalyticsCollector {
    scores: Vec<f64>,
    turns: Vec<f64>,
    outcomes: BTreeMap<String, usize>,
    histogram: [usize; MAX_SCORE + 1],
}

impl AnalyticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) {
        self.scores.push(outcome.score as f64);
        self.turns.push(outcome.turns as f64);
        *self.outcomes.entry(outcome.outcome.clone()).or_insert(0) += 1;
        self.histogram[(outcome.score as usize).min(MAX_SCORE)] += 1;
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let games = self.scores.len();
        let (mean_score, avg_turns) = if games == 0 {
            (0.0, 0.0)
        } else {
            (self.scores.iter().mean(), self.turns.iter().mean())
        };
        let min_score = if games == 0 {
            0
        } else {
            self.scores.iter().copied().fold(f64::INFINITY, f64::min) as u32
        };

        AnalyticsSummary {
            games,
            mean_score,
            ci95: confidence_interval(&self.scores),
            min_score,
            max_score: self.scores.iter().copied().fold(0.0, f64::max) as u32,
            avg_turns,
            perfect_games: self.histogram[MAX_SCORE],
            outcomes: self.outcomes,
            histogram: self.histogram,
        }
    }
}

fn confidence_interval(samples: &[f64]) -> (f64, f64) {
    if samples.len() < 2 {
        let value = samples.first().copied().unwrap_or(0.0);
        return (value, value);
    }
    let mean = samples.iter().mean();
    let std_dev = samples.iter().std_dev();
    let half = CONFIDENCE_Z * std_dev / (samples.len() as f64).sqrt();
    (mean - half, mean + half)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub games: usize,
    pub mean_score: f64,
    pub ci95: (f64, f64),
    pub min_score: u32,
    pub max_score: u32,
    pub avg_turns: f64,
    pub perfect_games: usize,
    pub outcomes: BTreeMap<String, usize>,
    #[serde(skip)]
    pub histogram: [usize; MAX_SCORE + 1],
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Simulation Summary\n\n");
        rows.push_str("| Games | Mean score | 95% CI | Min | Max | Perfect | Avg turns |\n");
        rows.push_str("|-------|------------|--------|-----|-----|---------|-----------|\n");
        rows.push_str(&format!(
            "| {games} | {mean:.3} | [{ci_low:.3}, {ci_high:.3}] | {min} | {max} | {perfect} | {turns:.1} |\n",
            games = self.games,
            mean = self.mean_score,
            ci_low = self.ci95.0,
            ci_high = self.ci95.1,
            min = self.min_score,
            max = self.max_score,
            perfect = self.perfect_games,
            turns = self.avg_turns,
        ));

        rows.push_str("\n## Outcomes\n\n");
        rows.push_str("| Outcome | Games |\n");
        rows.push_str("|---------|-------|\n");
        for (outcome, count) in &self.outcomes {
            rows.push_str(&format!("| {outcome} | {count} |\n"));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("score_histogram.png");
        let histogram = self.histogram;
        let max_count = histogram.iter().copied().max().unwrap_or(0).max(1);

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Final score distribution", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(0usize..MAX_SCORE + 1, 0usize..max_count + 1)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Games")
                .x_desc("Score")
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(histogram.iter().enumerate().map(|(score, &count)| {
                    Rectangle::new([(score, 0), (score + 1, count)], BLUE.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnalyticsCollector;
    use crate::simulation::GameOutcome;

    fn outcome(score: u32, turns: u32, label: &str) -> GameOutcome {
        GameOutcome {
            seed: 0,
            players: 5,
            score,
            turns,
            outcome: label.to_string(),
            hints_remaining: 0,
            mistakes_remaining: 3,
        }
    }

    #[test]
    fn summary_aggregates_scores_and_outcomes() {
        let mut collector = AnalyticsCollector::new();
        collector.record_game(&outcome(10, 40, "no legal actions remain"));
        collector.record_game(&outcome(20, 50, "no legal actions remain"));
        collector.record_game(&outcome(25, 60, "no legal actions remain"));
        collector.record_game(&outcome(0, 12, "ran out of mistake tokens"));

        let summary = collector.finalize();
        assert_eq!(summary.games, 4);
        assert!((summary.mean_score - 13.75).abs() < 1e-9);
        assert_eq!(summary.min_score, 0);
        assert_eq!(summary.max_score, 25);
        assert_eq!(summary.perfect_games, 1);
        assert_eq!(summary.outcomes["no legal actions remain"], 3);
        assert_eq!(summary.outcomes["ran out of mistake tokens"], 1);
        assert!(summary.ci95.0 < summary.mean_score);
        assert!(summary.ci95.1 > summary.mean_score);
    }

    #[test]
    fn markdown_summary_lists_outcome_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("summary.md");

        let mut collector = AnalyticsCollector::new();
        collector.record_game(&outcome(7, 30, "the last copy of R1 was discarded"));
        let summary = collector.finalize();
        summary.write_markdown(&path).expect("markdown written");

        let text = std::fs::read_to_string(&path).expect("readable");
        assert!(text.contains("# Simulation Summary"));
        assert!(text.contains("| the last copy of R1 was discarded | 1 |"));
    }
}
