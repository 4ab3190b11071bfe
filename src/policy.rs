//! ε-greedy target selection over a linear Q-function

use rand::{Rng, seq::IndexedRandom};

use crate::{
    features::{FeatureContext, FeatureExtractor},
    identifiers::UnitId,
    q_function::LinearQFunction,
};

/// Index of the highest score; ties go to the earliest index.
///
/// Returns `None` when no score is above `-∞` (empty input, all `NaN`, or all
/// `-∞`).
pub fn greedy_index(scores: &[f64]) -> Option<usize> {
    let mut best = None;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &score) in scores.iter().enumerate() {
        if score > best_value {
            best_value = score;
            best = Some(idx);
        }
    }
    best
}

/// Chooses which enemy a unit should attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedyPolicy {
    /// Exploration rate ε
    epsilon: f64,
}

impl EpsilonGreedyPolicy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Q-value of every candidate, in candidate order
    pub fn scores<E: FeatureExtractor + ?Sized>(
        &self,
        q: &LinearQFunction,
        extractor: &E,
        ctx: &FeatureContext<'_>,
        attacker: UnitId,
        candidates: &[UnitId],
    ) -> Vec<f64> {
        candidates
            .iter()
            .map(|&enemy| q.value(&extractor.extract(ctx, attacker, Some(enemy))))
            .collect()
    }

    /// Highest-Q candidate.
    ///
    /// Ties are broken by candidate order. When no candidate scores above
    /// `-∞` a uniformly random candidate is returned instead.
    pub fn greedy<E: FeatureExtractor + ?Sized, R: Rng + ?Sized>(
        &self,
        q: &LinearQFunction,
        extractor: &E,
        ctx: &FeatureContext<'_>,
        attacker: UnitId,
        candidates: &[UnitId],
        rng: &mut R,
    ) -> Option<UnitId> {
        let scores = self.scores(q, extractor, ctx, attacker, candidates);
        match greedy_index(&scores) {
            Some(idx) => Some(candidates[idx]),
            None => candidates.choose(rng).copied(),
        }
    }

    /// ε-greedy choice among `candidates`.
    ///
    /// With probability ε, and only when at least two candidates exist, the
    /// greedy choice is replaced by a uniformly random *other* candidate.
    pub fn select<E: FeatureExtractor + ?Sized, R: Rng + ?Sized>(
        &self,
        q: &LinearQFunction,
        extractor: &E,
        ctx: &FeatureContext<'_>,
        attacker: UnitId,
        candidates: &[UnitId],
        rng: &mut R,
    ) -> Option<UnitId> {
        let greedy = self.greedy(q, extractor, ctx, attacker, candidates, rng)?;

        if candidates.len() < 2 || rng.random::<f64>() >= self.epsilon {
            return Some(greedy);
        }

        let others: Vec<UnitId> = candidates
            .iter()
            .copied()
            .filter(|&enemy| enemy != greedy)
            .collect();
        Some(others.choose(rng).copied().unwrap_or(greedy))
    }
}
