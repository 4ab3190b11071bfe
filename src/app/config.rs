//! Configuration types for controller creation.

use std::{fs::File, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    adapters::text_weight_store::DEFAULT_WEIGHTS_PATH,
    reward::{RewardAttribution, RewardConfig},
    schedule::EvaluationSchedule,
};

/// Hyper-parameters of the learner.
///
/// # Examples
///
/// ```
/// use footman_rl::app::LearningConfig;
///
/// let config = LearningConfig::default().with_epsilon(0.1).with_seed(7);
/// assert_eq!(config.discount, 0.9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Step size α of the weight update
    pub learning_rate: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Seed for initial weights and exploration
    pub seed: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            learning_rate: 0.0001,
            epsilon: 0.02,
            seed: 12345,
        }
    }
}

impl LearningConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything a controller needs for one run.
///
/// Loaded from JSON with [`RunConfig::from_json_file`]; missing fields take
/// their defaults, so a file only has to name what it changes.
///
/// # Examples
///
/// ```
/// use footman_rl::app::RunConfig;
///
/// let config = RunConfig::default()
///     .with_episodes(50)
///     .with_load_weights(true);
/// assert_eq!(config.schedule.train_block, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Training episodes to play before the run ends
    pub episodes: usize,
    /// Start from the stored weight file instead of random weights
    pub load_weights: bool,
    pub weights_path: PathBuf,
    /// Type label of the units the controller commands
    pub unit_kind: String,
    pub schedule: EvaluationSchedule,
    pub reward: RewardConfig,
    pub learning: LearningConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            load_weights: false,
            weights_path: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            unit_kind: "footman".to_string(),
            schedule: EvaluationSchedule::default(),
            reward: RewardConfig::default(),
            learning: LearningConfig::default(),
        }
    }
}

impl RunConfig {
    /// Read a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_load_weights(mut self, load: bool) -> Self {
        self.load_weights = load;
        self
    }

    pub fn with_weights_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.weights_path = path.into();
        self
    }

    pub fn with_unit_kind(mut self, kind: impl Into<String>) -> Self {
        self.unit_kind = kind.into();
        self
    }

    pub fn with_schedule(mut self, schedule: EvaluationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_attribution(mut self, attribution: RewardAttribution) -> Self {
        self.reward.attribution = attribution;
        self
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.learning = learning;
        self
    }

    /// Reject values the controller cannot run with.
    ///
    /// Block sizes must be positive; γ and ε are probabilities.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.train_block == 0 || self.schedule.test_block == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "evaluation blocks must be non-empty (train {}, test {})",
                    self.schedule.train_block, self.schedule.test_block
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.learning.discount) {
            return Err(Error::InvalidConfiguration {
                message: format!("discount {} is outside [0, 1]", self.learning.discount),
            });
        }
        if !(0.0..=1.0).contains(&self.learning.epsilon) {
            return Err(Error::InvalidConfiguration {
                message: format!("epsilon {} is outside [0, 1]", self.learning.epsilon),
            });
        }
        Ok(())
    }
}
