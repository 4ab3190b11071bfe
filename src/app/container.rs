//! Dependency injection container for the footman controller.
//!
//! The container owns infrastructure dependencies (the weight store) and
//! provides factory methods for creating controllers wired to them.

use std::{path::Path, sync::Arc};

use super::config::RunConfig;
use crate::{
    Result, adapters::TextWeightStore, controller::EpisodeController, features::FeatureExtractor,
    ports::WeightStore,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use footman_rl::app::{App, RunConfig};
///
/// let app = App::new();
/// let controller = app.create_controller(RunConfig::default().with_episodes(20))?;
/// assert_eq!(controller.counters().train_total(), 20);
/// # Ok::<(), footman_rl::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use footman_rl::app::App;
/// use footman_rl::adapters::InMemoryWeightStore;
///
/// let app = App::for_testing()
///     .with_weight_store(InMemoryWeightStore::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Store used to load and persist weight vectors
    weight_store: Arc<dyn WeightStore + Send + Sync>,
    /// Seed overriding the one in each run config
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses `TextWeightStore` (one float per line) for persistence.
    pub fn new() -> Self {
        Self {
            weight_store: Arc::new(TextWeightStore::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the weight store.
    pub fn weight_store(&self) -> Arc<dyn WeightStore + Send + Sync> {
        Arc::clone(&self.weight_store)
    }

    fn prepare(&self, mut config: RunConfig) -> Result<RunConfig> {
        if let Some(seed) = self.default_seed {
            config.learning.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }

    /// Create a controller with the default feature set.
    pub fn create_controller(&self, config: RunConfig) -> Result<EpisodeController> {
        let config = self.prepare(config)?;
        Ok(EpisodeController::new(config, self.weight_store()))
    }

    /// Create a controller with a custom feature extractor.
    pub fn create_controller_with_extractor(
        &self,
        config: RunConfig,
        extractor: Box<dyn FeatureExtractor + Send + Sync>,
    ) -> Result<EpisodeController> {
        let config = self.prepare(config)?;
        Ok(EpisodeController::with_extractor(
            config,
            self.weight_store(),
            extractor,
        ))
    }

    /// Read a weight vector through the configured store.
    pub fn load_weights(&self, path: &Path) -> Result<Vec<f64>> {
        self.weight_store.load(path)
    }

    /// Write a weight vector through the configured store.
    pub fn save_weights(&self, weights: &[f64], path: &Path) -> Result<()> {
        self.weight_store.save(weights, path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory stores and control
/// randomness.
pub struct AppBuilder {
    weight_store: Option<Arc<dyn WeightStore + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            weight_store: None,
            default_seed: None,
        }
    }

    /// Set a custom weight store.
    pub fn with_weight_store<S: WeightStore + Send + Sync + 'static>(mut self, store: S) -> Self {
        self.weight_store = Some(Arc::new(store));
        self
    }

    /// Set a seed applied to every controller created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no store was specified, uses `TextWeightStore` by default.
    pub fn build(self) -> App {
        App {
            weight_store: self
                .weight_store
                .unwrap_or_else(|| Arc::new(TextWeightStore::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
