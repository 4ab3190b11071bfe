//! Weight store port for persisting the Q-function weights.
//!
//! Weights are a flat, ordered list of floating-point numbers in feature
//! order. Stores overwrite on save; a missing entry is reported as
//! [`crate::Error::MissingWeights`] so callers can fall back to fresh
//! weights instead of aborting.

use std::path::Path;

use crate::Result;

/// Port for saving and loading weight vectors.
///
/// # Examples
///
/// ```no_run
/// use footman_rl::ports::WeightStore;
/// use std::path::Path;
///
/// fn checkpoint<S: WeightStore>(store: &S, weights: &[f64]) -> footman_rl::Result<()> {
///     store.save(weights, Path::new("agent_weights/weights.txt"))
/// }
/// ```
pub trait WeightStore {
    /// Persist `weights` at `path`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be created or written.
    fn save(&self, weights: &[f64], path: &Path) -> Result<()>;

    /// Load the weight vector stored at `path`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::MissingWeights`] if nothing is stored there
    /// - [`crate::Error::ParseWeight`] if an entry is not a number
    /// - [`crate::Error::Io`] for other read failures
    fn load(&self, path: &Path) -> Result<Vec<f64>>;
}
