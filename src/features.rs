//! Feature extraction for (state, attacker, defender) triples
//!
//! Features are a pure function of the battle snapshot, the current attack
//! assignments, and the unit pair. Missing units never cause an error: the
//! defender may die between selection and evaluation, so every feature has a
//! sentinel for that case.

use crate::{
    assignment::AttackAssignments,
    battle::BattleSnapshot,
    identifiers::{Side, UnitId},
};

/// Number of features produced by [`TargetFeatures`].
pub const NUM_FEATURES: usize = 5;

/// Everything a feature function may look at.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext<'a> {
    pub snapshot: &'a BattleSnapshot,
    pub assignments: &'a AttackAssignments,
}

impl<'a> FeatureContext<'a> {
    pub fn new(snapshot: &'a BattleSnapshot, assignments: &'a AttackAssignments) -> Self {
        Self {
            snapshot,
            assignments,
        }
    }
}

/// Maps a state-action pair to a fixed-length feature vector.
pub trait FeatureExtractor {
    /// Length of every vector returned by [`FeatureExtractor::extract`].
    fn feature_count(&self) -> usize;

    /// Compute features for `attacker` considering `defender`.
    ///
    /// `defender` is `None` when the attacker has no bound target; that case
    /// must produce the same vector as a defender that is no longer present.
    fn extract(
        &self,
        ctx: &FeatureContext<'_>,
        attacker: UnitId,
        defender: Option<UnitId>,
    ) -> Vec<f64>;
}

/// Default five-feature set.
///
/// | # | feature | missing unit |
/// |---|---------|--------------|
/// | 0 | Chebyshev distance attacker→defender | 0 |
/// | 1 | defender health | 0 |
/// | 2 | attacker health | 0 |
/// | 3 | friendly units assigned to the defender | `untracked_sentinel` |
/// | 4 | `commitment_value` if the attacker is already on the defender, else 0 | `untracked_sentinel` |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFeatures {
    /// Value used for features 3 and 4 when the defender is not tracked
    pub untracked_sentinel: f64,
    /// Value of feature 4 when the attacker is committed to the defender
    pub commitment_value: f64,
}

impl Default for TargetFeatures {
    fn default() -> Self {
        Self {
            untracked_sentinel: 5.0,
            commitment_value: 5.0,
        }
    }
}

impl FeatureExtractor for TargetFeatures {
    fn feature_count(&self) -> usize {
        NUM_FEATURES
    }

    fn extract(
        &self,
        ctx: &FeatureContext<'_>,
        attacker: UnitId,
        defender: Option<UnitId>,
    ) -> Vec<f64> {
        let friendly = ctx.snapshot.unit(Side::Friendly, attacker);
        let enemy = defender.and_then(|id| ctx.snapshot.unit(Side::Enemy, id));
        let attacker_set = defender.and_then(|id| ctx.assignments.attackers_of(id));

        let distance = match (friendly, enemy) {
            (Some(f), Some(e)) => f64::from(f.chebyshev_distance(e)),
            _ => 0.0,
        };

        let (assigned, committed) = match attacker_set {
            Some(set) => (
                set.len() as f64,
                if set.contains(&attacker) {
                    self.commitment_value
                } else {
                    0.0
                },
            ),
            None => (self.untracked_sentinel, self.untracked_sentinel),
        };

        vec![
            distance,
            enemy.map_or(0.0, |e| e.health),
            friendly.map_or(0.0, |f| f.health),
            assigned,
            committed,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::UnitView;

    fn id(n: u32) -> UnitId {
        UnitId::new(n)
    }

    fn snapshot() -> BattleSnapshot {
        BattleSnapshot::new(3)
            .with_unit(UnitView::new(id(0), Side::Friendly, "Footman", 2, 2, 120.0))
            .with_unit(UnitView::new(id(1), Side::Friendly, "Footman", 3, 2, 90.0))
            .with_unit(UnitView::new(id(10), Side::Enemy, "Footman", 6, 4, 45.0))
    }

    #[test]
    fn live_pair_produces_full_vector() {
        let snap = snapshot();
        let mut assignments = AttackAssignments::new();
        assignments.assign(id(0), id(10));
        assignments.assign(id(1), id(10));

        let features = TargetFeatures::default().extract(
            &FeatureContext::new(&snap, &assignments),
            id(0),
            Some(id(10)),
        );

        assert_eq!(features, vec![4.0, 45.0, 120.0, 2.0, 5.0]);
    }

    #[test]
    fn uncommitted_attacker_gets_zero_flag() {
        let snap = snapshot();
        let mut assignments = AttackAssignments::new();
        assignments.assign(id(1), id(10));

        let features = TargetFeatures::default().extract(
            &FeatureContext::new(&snap, &assignments),
            id(0),
            Some(id(10)),
        );

        assert_eq!(features[3], 1.0);
        assert_eq!(features[4], 0.0);
    }

    #[test]
    fn dead_defender_uses_sentinels() {
        let snap = snapshot();
        let assignments = AttackAssignments::new();

        let features = TargetFeatures::default().extract(
            &FeatureContext::new(&snap, &assignments),
            id(0),
            Some(id(77)),
        );

        assert_eq!(features, vec![0.0, 0.0, 120.0, 5.0, 5.0]);
    }

    #[test]
    fn missing_target_matches_dead_defender() {
        let snap = snapshot();
        let assignments = AttackAssignments::new();
        let extractor = TargetFeatures::default();
        let ctx = FeatureContext::new(&snap, &assignments);

        assert_eq!(
            extractor.extract(&ctx, id(0), None),
            extractor.extract(&ctx, id(0), Some(id(77)))
        );
    }

    #[test]
    fn missing_attacker_zeroes_its_health_and_distance() {
        let snap = snapshot();
        let mut assignments = AttackAssignments::new();
        assignments.track(id(10));

        let features = TargetFeatures::default().extract(
            &FeatureContext::new(&snap, &assignments),
            id(42),
            Some(id(10)),
        );

        assert_eq!(features, vec![0.0, 45.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn vector_length_matches_feature_count() {
        let snap = snapshot();
        let assignments = AttackAssignments::new();
        let extractor = TargetFeatures::default();
        let features =
            extractor.extract(&FeatureContext::new(&snap, &assignments), id(0), Some(id(10)));
        assert_eq!(features.len(), extractor.feature_count());
    }
}
