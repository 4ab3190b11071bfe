//! Grid skirmish engine implementing the simulator port.
//!
//! Two columns of footmen face each other on an open grid. A unit with an
//! order walks one king-move per turn toward its target and strikes once it
//! is adjacent. Enemy footmen always go for the nearest friendly unit.
//! There is no terrain and units may share tiles; the engine exists to drive
//! the controller end-to-end, not to model a real game.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    battle::{
        ActionFeedback, AttackCommand, BattleSnapshot, DamageLog, DeathLog, TurnHistory, UnitView,
    },
    identifiers::{Side, UnitId},
    ports::{BattleSimulator, TurnObservation},
};

/// Unit type label used for every unit on the field.
pub const FOOTMAN: &str = "Footman";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkirmishConfig {
    pub units_per_side: u32,
    pub width: i32,
    pub height: i32,
    pub max_health: f64,
    /// Inclusive damage range of a single strike
    pub min_damage: u32,
    pub max_damage: u32,
    /// Episode is cut off after this many turns
    pub max_turns: u32,
    pub seed: u64,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            units_per_side: 5,
            width: 16,
            height: 12,
            max_health: 60.0,
            min_damage: 2,
            max_damage: 9,
            max_turns: 400,
            seed: 0,
        }
    }
}

impl SkirmishConfig {
    pub fn with_units_per_side(mut self, units: u32) -> Self {
        self.units_per_side = units;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }
}

/// Grid skirmish between two equal groups of footmen.
#[derive(Debug, Clone)]
pub struct Skirmish {
    config: SkirmishConfig,
    snapshot: BattleSnapshot,
    /// Standing friendly orders: attacker -> target
    orders: BTreeMap<UnitId, UnitId>,
    rng: StdRng,
}

impl Skirmish {
    pub fn new(config: SkirmishConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            snapshot: BattleSnapshot::new(0),
            orders: BTreeMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &SkirmishConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &BattleSnapshot {
        &self.snapshot
    }

    fn is_over(&self) -> bool {
        self.snapshot.count(Side::Friendly) == 0
            || self.snapshot.count(Side::Enemy) == 0
            || self.snapshot.turn() >= self.config.max_turns
    }

    fn observe(&self, history: TurnHistory) -> TurnObservation {
        TurnObservation {
            snapshot: self.snapshot.clone(),
            history,
            terminal: self.is_over(),
        }
    }

    fn layout(&mut self) {
        let n = self.config.units_per_side;
        let spacing = (self.config.height / n.max(1) as i32).max(1);
        let left = 1;
        let right = (self.config.width - 2).max(left + 1);

        for i in 0..n {
            let y = (i as i32 * spacing).min(self.config.height - 1);
            self.snapshot.insert(UnitView::new(
                UnitId::new(i),
                Side::Friendly,
                FOOTMAN,
                left,
                y,
                self.config.max_health,
            ));
            self.snapshot.insert(UnitView::new(
                UnitId::new(n + i),
                Side::Enemy,
                FOOTMAN,
                right,
                y,
                self.config.max_health,
            ));
        }
    }

    fn nearest_friendly(&self, enemy: &UnitView) -> Option<UnitId> {
        self.snapshot
            .units(Side::Friendly)
            .values()
            .min_by_key(|f| (f.chebyshev_distance(enemy), f.id))
            .map(|f| f.id)
    }

    /// Move toward or strike `target`; returns the damage log of a strike.
    fn act(&mut self, side: Side, unit: UnitId, target: UnitId) -> Option<DamageLog> {
        let target_side = side.opponent();
        let (ux, uy) = {
            let attacker = self.snapshot.unit(side, unit)?;
            if attacker.health <= 0.0 {
                return None;
            }
            (attacker.x, attacker.y)
        };
        let (tx, ty, alive) = {
            let defender = self.snapshot.unit(target_side, target)?;
            (defender.x, defender.y, defender.health > 0.0)
        };
        if !alive {
            return None;
        }

        if (ux - tx).abs().max((uy - ty).abs()) <= 1 {
            let amount = f64::from(
                self.rng
                    .random_range(self.config.min_damage..=self.config.max_damage.max(self.config.min_damage)),
            );
            if let Some(defender) = self.snapshot.unit_mut(target_side, target) {
                defender.health -= amount;
            }
            return Some(DamageLog {
                attacker: unit,
                attacker_side: side,
                defender: target,
                defender_side: target_side,
                amount,
            });
        }

        if let Some(attacker) = self.snapshot.unit_mut(side, unit) {
            attacker.x += (tx - ux).signum();
            attacker.y += (ty - uy).signum();
        }
        None
    }
}

impl BattleSimulator for Skirmish {
    fn reset(&mut self, episode: usize) -> Result<TurnObservation> {
        // one row per unit keeps every footman on its own tile
        let fits = i64::from(self.config.units_per_side) <= i64::from(self.config.height);
        if self.config.units_per_side == 0 || self.config.width < 3 || self.config.height < 1 || !fits {
            return Err(Error::Simulator {
                message: format!(
                    "cannot lay out {} units per side on a {}x{} grid",
                    self.config.units_per_side, self.config.width, self.config.height
                ),
            });
        }
        self.rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(episode as u64));
        self.snapshot = BattleSnapshot::new(0);
        self.orders.clear();
        self.layout();
        Ok(self.observe(TurnHistory::new()))
    }

    fn step(&mut self, commands: &[AttackCommand]) -> Result<TurnObservation> {
        let mut history = TurnHistory::new();

        for command in commands {
            if self.snapshot.unit(Side::Friendly, command.attacker).is_some() {
                self.orders.insert(command.attacker, command.target);
                history.commands_issued.insert(command.attacker, *command);
            }
        }

        let mut feedback = BTreeMap::new();
        let friendly_orders: Vec<(UnitId, UnitId)> =
            self.orders.iter().map(|(&a, &t)| (a, t)).collect();
        for (attacker, target) in friendly_orders {
            if self.snapshot.unit(Side::Enemy, target).is_none() {
                feedback.insert(attacker, ActionFeedback::Failed);
                continue;
            }
            if let Some(log) = self.act(Side::Friendly, attacker, target) {
                history.damage.push(log);
            }
        }

        let enemy_ids: Vec<UnitId> = self.snapshot.unit_ids(Side::Enemy).collect();
        for enemy in enemy_ids {
            let target = self
                .snapshot
                .unit(Side::Enemy, enemy)
                .and_then(|view| self.nearest_friendly(view));
            if let Some(log) = target.and_then(|target| self.act(Side::Enemy, enemy, target)) {
                history.damage.push(log);
            }
        }

        for side in [Side::Friendly, Side::Enemy] {
            let dead: Vec<UnitId> = self
                .snapshot
                .units(side)
                .values()
                .filter(|u| u.health <= 0.0)
                .map(|u| u.id)
                .collect();
            for unit in dead {
                self.snapshot.remove(side, unit);
                history.deaths.push(DeathLog { unit, side });
            }
        }

        for (&attacker, &target) in &self.orders {
            if feedback.contains_key(&attacker) {
                continue;
            }
            let status = if self.snapshot.unit(Side::Enemy, target).is_none() {
                ActionFeedback::Completed
            } else {
                ActionFeedback::Incomplete
            };
            feedback.insert(attacker, status);
        }
        feedback.retain(|unit, _| self.snapshot.unit(Side::Friendly, *unit).is_some());
        self.orders.retain(|attacker, _| {
            feedback
                .get(attacker)
                .is_some_and(|status| !status.is_finished())
        });
        history.feedback = feedback;

        let next_turn = self.snapshot.turn() + 1;
        self.snapshot.set_turn(next_turn);
        Ok(self.observe(history))
    }
}
