//! Observer pattern for training runs
//!
//! Observers allow composable data collection during a run without coupling
//! the episode loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    controller::{EpisodeReport, EpisodeSummary},
    ports::Observer,
    report::{LearningCurve, TestBlockRecord},
    schedule::Phase,
};

/// Progress bar observer - Shows run progress and the latest evaluation
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    last_average: Option<f64>,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            last_average: None,
        }
    }

    fn message(&self) -> String {
        match self.last_average {
            Some(avg) => format!("won {} | last eval {avg:.2}", self.wins),
            None => format!("won {}", self.wins),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, planned_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(planned_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        if report.summary.won {
            self.wins += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_test_block(&mut self, record: &TestBlockRecord) -> Result<()> {
        self.last_average = Some(record.average_reward);
        Ok(())
    }

    fn on_run_end(&mut self, _curve: &LearningCurve) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-phase episode statistics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    train_episodes: usize,
    test_episodes: usize,
    wins: usize,
    turns: Vec<u32>,
    updates: usize,
    commands: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_episodes(&self) -> usize {
        self.train_episodes + self.test_episodes
    }

    /// Get current win rate over all episodes
    pub fn win_rate(&self) -> f64 {
        let total = self.total_episodes();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }

    /// Get average episode length in turns
    pub fn avg_episode_length(&self) -> f64 {
        if self.turns.is_empty() {
            0.0
        } else {
            self.turns.iter().map(|&t| f64::from(t)).sum::<f64>() / self.turns.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            train_episodes: self.train_episodes,
            test_episodes: self.test_episodes,
            wins: self.wins,
            win_rate: self.win_rate(),
            avg_episode_length: self.avg_episode_length(),
            updates: self.updates,
            commands: self.commands,
        }
    }
}

/// Summary of run metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub train_episodes: usize,
    pub test_episodes: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_episode_length: f64,
    pub updates: usize,
    pub commands: usize,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        let summary = &report.summary;
        match summary.phase {
            Phase::Train => self.train_episodes += 1,
            Phase::Test => self.test_episodes += 1,
        }
        if summary.won {
            self.wins += 1;
        }
        self.turns.push(summary.turns);
        self.updates += summary.updates;
        self.commands += summary.commands;
        Ok(())
    }
}

/// One line of the JSONL export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Episode(EpisodeSummary),
    TestBlock(TestBlockRecord),
}

/// JSONL observer - Exports episode summaries and evaluation blocks to JSON
/// Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_event(&mut self, event: &RunEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.write_event(&RunEvent::Episode(report.summary.clone()))
    }

    fn on_test_block(&mut self, record: &TestBlockRecord) -> Result<()> {
        self.write_event(&RunEvent::TestBlock(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader};

    use tempfile::TempDir;

    use super::*;
    use crate::schedule::PhaseTransition;

    fn report(index: usize, phase: Phase, won: bool) -> EpisodeReport {
        EpisodeReport {
            summary: EpisodeSummary {
                index,
                phase,
                turns: 40,
                updates: 12,
                commands: 7,
                reward: -3.5,
                survivors: if won { 2 } else { 0 },
                won,
            },
            transition: PhaseTransition {
                finished: phase,
                next: phase,
                completed_block: None,
                run_complete: false,
            },
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();
        assert_eq!(observer.win_rate(), 0.0);

        observer.on_episode_end(&report(0, Phase::Train, true)).unwrap();
        observer.on_episode_end(&report(1, Phase::Train, false)).unwrap();
        observer.on_episode_end(&report(2, Phase::Test, true)).unwrap();

        let summary = observer.summary();
        assert_eq!(summary.train_episodes, 2);
        assert_eq!(summary.test_episodes, 1);
        assert_eq!(summary.updates, 36);
        assert!((summary.win_rate - 0.666).abs() < 0.01);
        assert_eq!(summary.avg_episode_length, 40.0);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.jsonl");
        {
            let mut observer = JsonlObserver::new(&path).unwrap();
            observer.on_episode_end(&report(0, Phase::Train, false)).unwrap();
            observer
                .on_test_block(&TestBlockRecord {
                    episodes_played: 10,
                    average_reward: 12.5,
                })
                .unwrap();
        }

        let lines: Vec<String> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first: RunEvent = serde_json::from_str(&lines[0]).unwrap();
        assert!(matches!(first, RunEvent::Episode(ref s) if s.index == 0));
        let second: RunEvent = serde_json::from_str(&lines[1]).unwrap();
        assert!(matches!(second, RunEvent::TestBlock(ref r) if r.episodes_played == 10));
    }
}
