//! Bookkeeping of which friendly unit is attacking which enemy

use std::collections::{BTreeMap, BTreeSet};

use crate::identifiers::UnitId;

/// Map from enemy id to the set of friendly units attacking it.
///
/// A friendly unit is in at most one attacker set at a time. `assign` is the
/// only way to put a unit into a set and it always clears the unit from every
/// other set first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackAssignments {
    attackers: BTreeMap<UnitId, BTreeSet<UnitId>>,
}

impl AttackAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an enemy with nobody assigned to it yet.
    pub fn track(&mut self, enemy: UnitId) {
        self.attackers.entry(enemy).or_default();
    }

    /// Point `friendly` at `enemy`, dropping any previous target.
    pub fn assign(&mut self, friendly: UnitId, enemy: UnitId) {
        self.release(friendly);
        self.attackers.entry(enemy).or_default().insert(friendly);
    }

    /// Current target of a friendly unit, if any.
    pub fn target_of(&self, friendly: UnitId) -> Option<UnitId> {
        self.attackers
            .iter()
            .find(|(_, set)| set.contains(&friendly))
            .map(|(&enemy, _)| enemy)
    }

    /// Attacker set of an enemy; `None` when the enemy is not tracked.
    pub fn attackers_of(&self, enemy: UnitId) -> Option<&BTreeSet<UnitId>> {
        self.attackers.get(&enemy)
    }

    pub fn is_tracked(&self, enemy: UnitId) -> bool {
        self.attackers.contains_key(&enemy)
    }

    /// Friendly unit died: it no longer attacks anybody.
    pub fn on_friendly_death(&mut self, friendly: UnitId) {
        self.release(friendly);
    }

    /// Enemy died: its former attackers become targetless.
    pub fn on_enemy_death(&mut self, enemy: UnitId) -> Option<BTreeSet<UnitId>> {
        self.attackers.remove(&enemy)
    }

    /// Tracked enemies in ascending id order
    pub fn enemies(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.attackers.keys().copied()
    }

    pub fn clear(&mut self) {
        self.attackers.clear();
    }

    fn release(&mut self, friendly: UnitId) {
        for set in self.attackers.values_mut() {
            set.remove(&friendly);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> UnitId {
        UnitId::new(n)
    }

    #[test]
    fn reassignment_moves_unit_between_sets() {
        let mut map = AttackAssignments::new();
        map.assign(id(1), id(10));
        map.assign(id(1), id(20));

        assert_eq!(map.target_of(id(1)), Some(id(20)));
        assert!(!map.attackers_of(id(10)).unwrap().contains(&id(1)));
        assert!(map.attackers_of(id(20)).unwrap().contains(&id(1)));
    }

    #[test]
    fn assigning_same_target_twice_keeps_one_entry() {
        let mut map = AttackAssignments::new();
        map.assign(id(1), id(10));
        map.assign(id(1), id(10));
        assert_eq!(map.attackers_of(id(10)).unwrap().len(), 1);
    }

    #[test]
    fn friendly_death_clears_every_set() {
        let mut map = AttackAssignments::new();
        map.track(id(10));
        map.track(id(20));
        map.assign(id(1), id(10));
        map.assign(id(2), id(10));

        map.on_friendly_death(id(1));

        assert_eq!(map.target_of(id(1)), None);
        assert_eq!(map.attackers_of(id(10)).unwrap().len(), 1);
        assert!(map.enemies().all(|e| !map.attackers_of(e).unwrap().contains(&id(1))));
    }

    #[test]
    fn enemy_death_leaves_attackers_targetless() {
        let mut map = AttackAssignments::new();
        map.assign(id(1), id(10));
        map.assign(id(2), id(10));

        let former = map.on_enemy_death(id(10)).unwrap();

        assert_eq!(former.len(), 2);
        assert!(!map.is_tracked(id(10)));
        assert_eq!(map.target_of(id(1)), None);
        assert_eq!(map.target_of(id(2)), None);
    }

    #[test]
    fn unknown_unit_has_no_target() {
        let map = AttackAssignments::new();
        assert_eq!(map.target_of(id(99)), None);
    }

    #[test]
    fn track_does_not_reset_existing_attackers() {
        let mut map = AttackAssignments::new();
        map.assign(id(1), id(10));
        map.track(id(10));
        assert_eq!(map.target_of(id(1)), Some(id(10)));
    }
}
