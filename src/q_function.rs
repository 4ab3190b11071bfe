//! Linear action-value function approximation
//!
//! Q(s,a) = w · f(s,a). Weights are corrected toward the discounted return a
//! unit actually collected since its previous decision event:
//!
//! w_i ← w_i + α [G - w · f] f_i
//!
//! The target `G` is the realised return, not `r + γ max_a' Q(s',a')`. The
//! weight vector is never normalised.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dot product of two equally sized vectors
pub fn dot(weights: &[f64], features: &[f64]) -> f64 {
    debug_assert_eq!(weights.len(), features.len());
    weights.iter().zip(features).map(|(w, f)| w * f).sum()
}

/// Pure update rule: returns the corrected copy of `old_weights`.
///
/// # Examples
///
/// ```
/// use footman_rl::q_function::updated_weights;
///
/// let new = updated_weights(&[0.0; 5], &[1.0, 2.0, 3.0, 4.0, 5.0], 10.0, 0.0001);
/// assert!((new[0] - 0.001).abs() < 1e-12);
/// assert!((new[4] - 0.005).abs() < 1e-12);
/// ```
pub fn updated_weights(
    old_weights: &[f64],
    features: &[f64],
    cumulative_reward: f64,
    step_size: f64,
) -> Vec<f64> {
    let error = cumulative_reward - dot(old_weights, features);
    old_weights
        .iter()
        .zip(features)
        .map(|(w, f)| w + step_size * error * f)
        .collect()
}

/// Weight vector plus step size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearQFunction {
    weights: Vec<f64>,
    /// Step size α
    learning_rate: f64,
}

impl LinearQFunction {
    /// Wrap an existing weight vector
    pub fn new(weights: Vec<f64>, learning_rate: f64) -> Self {
        Self {
            weights,
            learning_rate,
        }
    }

    /// All-zero weights
    pub fn zeros(feature_count: usize, learning_rate: f64) -> Self {
        Self::new(vec![0.0; feature_count], learning_rate)
    }

    /// Weights drawn uniformly from [-1, 1)
    pub fn random<R: Rng + ?Sized>(feature_count: usize, learning_rate: f64, rng: &mut R) -> Self {
        let weights = (0..feature_count)
            .map(|_| rng.random::<f64>() * 2.0 - 1.0)
            .collect();
        Self::new(weights, learning_rate)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Replace the weight vector, keeping its length fixed.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(Error::WeightCountMismatch {
                expected: self.weights.len(),
                got: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Q-value for a feature vector
    pub fn value(&self, features: &[f64]) -> f64 {
        dot(&self.weights, features)
    }

    /// Apply one correction toward `cumulative_reward`.
    ///
    /// Returns the prediction error `G - w · f` measured before the update.
    pub fn update(&mut self, features: &[f64], cumulative_reward: f64) -> f64 {
        let error = cumulative_reward - self.value(features);
        self.weights = updated_weights(
            &self.weights,
            features,
            cumulative_reward,
            self.learning_rate,
        );
        error
    }
}
