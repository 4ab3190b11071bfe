//! TRAIN/TEST episode scheduling
//!
//! Training runs in blocks: after every `train_block` completed training
//! episodes the controller plays `test_block` evaluation episodes with
//! learning frozen, records their average reward, and goes back to training.
//! The run ends once the training total is reached and the evaluation block
//! in progress has finished.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::{LearningCurve, TestBlockRecord};

/// Mode of the episode being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Weights are updated on event turns
    Train,
    /// Weights are frozen; rewards go into the evaluation total
    Test,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Block sizes for alternating training and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSchedule {
    /// Training episodes between evaluation blocks
    pub train_block: usize,
    /// Episodes per evaluation block
    pub test_block: usize,
}

impl Default for EvaluationSchedule {
    fn default() -> Self {
        Self {
            train_block: 10,
            test_block: 5,
        }
    }
}

impl EvaluationSchedule {
    pub fn new(train_block: usize, test_block: usize) -> Self {
        Self {
            train_block,
            test_block,
        }
    }

    /// Number of evaluation blocks a run of `train_total` episodes will play
    pub fn test_blocks(&self, train_total: usize) -> usize {
        if train_total == 0 {
            1
        } else {
            train_total.div_ceil(self.train_block.max(1))
        }
    }

    /// Total episodes (training plus evaluation) of a complete run
    pub fn planned_episodes(&self, train_total: usize) -> usize {
        train_total + self.test_blocks(train_total) * self.test_block.max(1)
    }
}

/// What happened when an episode was closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTransition {
    /// Mode the finished episode was played in
    pub finished: Phase,
    /// Mode of the next episode
    pub next: Phase,
    /// Set when the finished episode closed an evaluation block
    pub completed_block: Option<TestBlockRecord>,
    /// Set once the training total is reached and the last block is done
    pub run_complete: bool,
}

/// Process-wide episode counters and the learning curve they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeCounters {
    schedule: EvaluationSchedule,
    train_total: usize,
    phase: Phase,
    train_episodes_played: usize,
    test_episodes_played: usize,
    test_reward: f64,
    curve: LearningCurve,
    complete: bool,
}

impl EpisodeCounters {
    /// Counters for a run of `train_total` training episodes.
    ///
    /// A total of zero starts directly in evaluation so the run still
    /// produces one measurement.
    pub fn new(schedule: EvaluationSchedule, train_total: usize) -> Self {
        Self {
            schedule,
            train_total,
            phase: if train_total == 0 {
                Phase::Test
            } else {
                Phase::Train
            },
            train_episodes_played: 0,
            test_episodes_played: 0,
            test_reward: 0.0,
            curve: LearningCurve::default(),
            complete: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn schedule(&self) -> &EvaluationSchedule {
        &self.schedule
    }

    pub fn train_total(&self) -> usize {
        self.train_total
    }

    pub fn train_episodes_played(&self) -> usize {
        self.train_episodes_played
    }

    pub fn test_episodes_played(&self) -> usize {
        self.test_episodes_played
    }

    /// Discounted reward collected so far in the current evaluation block
    pub fn test_reward(&self) -> f64 {
        self.test_reward
    }

    pub fn learning_curve(&self) -> &LearningCurve {
        &self.curve
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Add discounted reward earned during an evaluation episode
    pub fn add_test_reward(&mut self, discounted: f64) {
        self.test_reward += discounted;
    }

    /// Close the current episode and advance the state machine.
    pub fn finish_episode(&mut self) -> PhaseTransition {
        let finished = self.phase;
        let mut completed_block = None;

        match finished {
            Phase::Train => {
                self.train_episodes_played += 1;
                let block_done = self
                    .train_episodes_played
                    .is_multiple_of(self.schedule.train_block.max(1));
                if block_done || self.train_episodes_played >= self.train_total {
                    self.phase = Phase::Test;
                }
            }
            Phase::Test => {
                self.test_episodes_played += 1;
                let block_size = self.schedule.test_block.max(1);
                if self.test_episodes_played >= block_size {
                    let record = TestBlockRecord {
                        episodes_played: self.train_episodes_played,
                        average_reward: self.test_reward / block_size as f64,
                    };
                    self.curve.push(record.clone());
                    completed_block = Some(record);

                    self.test_episodes_played = 0;
                    self.test_reward = 0.0;
                    self.phase = Phase::Train;
                    if self.train_episodes_played >= self.train_total {
                        self.complete = true;
                    }
                }
            }
        }

        PhaseTransition {
            finished,
            next: self.phase,
            completed_block,
            run_complete: self.complete,
        }
    }
}
