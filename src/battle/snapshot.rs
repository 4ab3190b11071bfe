//! Per-turn view of every unit on the field

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifiers::{Side, UnitId};

/// A single unit as reported by the simulator for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub side: Side,
    /// Unit type label, e.g. "Footman"
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub health: f64,
}

impl UnitView {
    pub fn new(id: UnitId, side: Side, kind: impl Into<String>, x: i32, y: i32, health: f64) -> Self {
        Self {
            id,
            side,
            kind: kind.into(),
            x,
            y,
            health,
        }
    }

    /// Chebyshev (king-move) distance between two units.
    pub fn chebyshev_distance(&self, other: &UnitView) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Case-insensitive check of the unit type label.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }
}

/// State snapshot for a single turn.
///
/// Units are keyed by side and id, so the same integer handle may appear on
/// both sides without colliding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleSnapshot {
    turn: u32,
    friendly: BTreeMap<UnitId, UnitView>,
    enemy: BTreeMap<UnitId, UnitView>,
}

impl BattleSnapshot {
    /// Create an empty snapshot for the given turn
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            friendly: BTreeMap::new(),
            enemy: BTreeMap::new(),
        }
    }

    /// Builder-style insert, handy when assembling fixtures
    pub fn with_unit(mut self, unit: UnitView) -> Self {
        self.insert(unit);
        self
    }

    /// Insert or replace a unit
    pub fn insert(&mut self, unit: UnitView) {
        match unit.side {
            Side::Friendly => self.friendly.insert(unit.id, unit),
            Side::Enemy => self.enemy.insert(unit.id, unit),
        };
    }

    /// Remove a unit, returning its last view
    pub fn remove(&mut self, side: Side, id: UnitId) -> Option<UnitView> {
        self.units_mut(side).remove(&id)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// Look up a unit; `None` once it has died or was never present
    pub fn unit(&self, side: Side, id: UnitId) -> Option<&UnitView> {
        self.units(side).get(&id)
    }

    pub fn unit_mut(&mut self, side: Side, id: UnitId) -> Option<&mut UnitView> {
        self.units_mut(side).get_mut(&id)
    }

    /// Ids on one side, in ascending handle order
    pub fn unit_ids(&self, side: Side) -> impl Iterator<Item = UnitId> + '_ {
        self.units(side).keys().copied()
    }

    /// Views on one side, in ascending handle order
    pub fn units(&self, side: Side) -> &BTreeMap<UnitId, UnitView> {
        match side {
            Side::Friendly => &self.friendly,
            Side::Enemy => &self.enemy,
        }
    }

    fn units_mut(&mut self, side: Side) -> &mut BTreeMap<UnitId, UnitView> {
        match side {
            Side::Friendly => &mut self.friendly,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Number of units still standing on one side
    pub fn count(&self, side: Side) -> usize {
        self.units(side).len()
    }
}
