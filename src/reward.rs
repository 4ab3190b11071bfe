//! Per-turn reward signal and discounted accumulation between decision events
//!
//! Reward for a turn is computed from the logs of the previous turn:
//!
//! - `-command_cost` per command issued
//! - `+damage` dealt to enemies, `-damage` received
//! - `+death_bonus` per enemy death, `-death_bonus` per friendly death
//!
//! Each unit's accumulator adds `γ^(t-1) · r` where `t` is the current turn,
//! and is reset to zero when an update fires for that unit.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    battle::TurnHistory,
    identifiers::{Side, UnitId},
};

/// Which events count toward a unit's reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardAttribution {
    /// Every friendly unit receives the side-wide signal.
    #[default]
    Side,
    /// Only events the unit took part in: its own commands, damage it dealt
    /// or received, and deaths of enemies it damaged that turn.
    Unit,
}

impl fmt::Display for RewardAttribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RewardAttribution::Side => "side",
            RewardAttribution::Unit => "unit",
        };
        f.write_str(label)
    }
}

impl FromStr for RewardAttribution {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "side" => Ok(RewardAttribution::Side),
            "unit" => Ok(RewardAttribution::Unit),
            _ => Err(crate::Error::ParseRewardAttribution {
                input: s.to_string(),
                expected: "side, unit".to_string(),
            }),
        }
    }
}

/// Reward constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Penalty per command issued (anti-dithering cost)
    pub command_cost: f64,
    /// Bonus per enemy death and penalty per friendly death
    pub death_bonus: f64,
    pub attribution: RewardAttribution,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            command_cost: 0.1,
            death_bonus: 100.0,
            attribution: RewardAttribution::Side,
        }
    }
}

impl RewardConfig {
    /// Undiscounted reward for `unit` given the previous turn's logs.
    pub fn turn_reward(&self, history: &TurnHistory, unit: UnitId) -> f64 {
        match self.attribution {
            RewardAttribution::Side => self.side_reward(history),
            RewardAttribution::Unit => self.unit_reward(history, unit),
        }
    }

    fn side_reward(&self, history: &TurnHistory) -> f64 {
        let mut reward = -self.command_cost * history.commands_issued.len() as f64;

        for damage in &history.damage {
            match damage.attacker_side {
                Side::Friendly => reward += damage.amount,
                Side::Enemy => reward -= damage.amount,
            }
        }

        for death in &history.deaths {
            match death.side {
                Side::Enemy => reward += self.death_bonus,
                Side::Friendly => reward -= self.death_bonus,
            }
        }

        reward
    }

    fn unit_reward(&self, history: &TurnHistory, unit: UnitId) -> f64 {
        let mut reward = 0.0;
        if history.commands_issued.contains_key(&unit) {
            reward -= self.command_cost;
        }

        for damage in &history.damage {
            if damage.attacker_side == Side::Friendly && damage.attacker == unit {
                reward += damage.amount;
            }
            if damage.defender_side == Side::Friendly && damage.defender == unit {
                reward -= damage.amount;
            }
        }

        for death in &history.deaths {
            match death.side {
                Side::Enemy => {
                    let struck = history.damage.iter().any(|d| {
                        d.attacker_side == Side::Friendly
                            && d.attacker == unit
                            && d.defender == death.unit
                    });
                    if struck {
                        reward += self.death_bonus;
                    }
                }
                Side::Friendly if death.unit == unit => reward -= self.death_bonus,
                Side::Friendly => {}
            }
        }

        reward
    }
}

/// Running discounted reward per friendly unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardAccumulator {
    config: RewardConfig,
    /// Discount factor γ
    discount: f64,
    running: BTreeMap<UnitId, f64>,
}

impl RewardAccumulator {
    pub fn new(config: RewardConfig, discount: f64) -> Self {
        Self {
            config,
            discount,
            running: BTreeMap::new(),
        }
    }

    /// Reward for `unit` on `turn`; always zero on turn 0.
    pub fn reward(&self, turn: u32, history: &TurnHistory, unit: UnitId) -> f64 {
        if turn == 0 {
            return 0.0;
        }
        self.config.turn_reward(history, unit)
    }

    /// γ^(t-1): discount for rewards observed on `turn`.
    pub fn discount_at(&self, turn: u32) -> f64 {
        let exponent = i32::try_from(turn.saturating_sub(1)).unwrap_or(i32::MAX);
        self.discount.powi(exponent)
    }

    /// Start an accumulator at zero for a unit entering the episode
    pub fn register(&mut self, unit: UnitId) {
        self.running.entry(unit).or_insert(0.0);
    }

    /// Add an already discounted reward, returning the new total.
    pub fn fold(&mut self, unit: UnitId, discounted: f64) -> f64 {
        let total = self.running.entry(unit).or_insert(0.0);
        *total += discounted;
        *total
    }

    /// Zero the accumulator after an update fired for `unit`.
    pub fn reset(&mut self, unit: UnitId) {
        if let Some(total) = self.running.get_mut(&unit) {
            *total = 0.0;
        }
    }

    /// Drop a dead unit's accumulator
    pub fn remove(&mut self, unit: UnitId) -> Option<f64> {
        self.running.remove(&unit)
    }

    pub fn get(&self, unit: UnitId) -> Option<f64> {
        self.running.get(&unit).copied()
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::AttackCommand;

    fn id(n: u32) -> UnitId {
        UnitId::new(n)
    }

    fn busy_turn() -> TurnHistory {
        TurnHistory::new()
            .with_command(AttackCommand::new(id(0), id(10)))
            .with_command(AttackCommand::new(id(1), id(11)))
            .with_damage((Side::Friendly, id(0)), (Side::Enemy, id(10)), 8.0)
            .with_damage((Side::Enemy, id(11)), (Side::Friendly, id(1)), 5.0)
            .with_death(Side::Enemy, id(10))
    }

    #[test]
    fn side_reward_sums_every_event() {
        let config = RewardConfig::default();
        // -0.2 + 8 - 5 + 100
        let reward = config.turn_reward(&busy_turn(), id(1));
        assert!((reward - 102.8).abs() < 1e-9);
    }

    #[test]
    fn side_reward_is_shared_by_all_units() {
        let config = RewardConfig::default();
        let history = busy_turn();
        assert_eq!(
            config.turn_reward(&history, id(0)),
            config.turn_reward(&history, id(1))
        );
    }

    #[test]
    fn friendly_death_is_penalised() {
        let config = RewardConfig::default();
        let history = TurnHistory::new().with_death(Side::Friendly, id(3));
        assert_eq!(config.turn_reward(&history, id(0)), -100.0);
    }

    #[test]
    fn unit_reward_only_counts_own_events() {
        let config = RewardConfig {
            attribution: RewardAttribution::Unit,
            ..RewardConfig::default()
        };
        let history = busy_turn();

        // unit 0: -0.1 + 8 + 100 (it struck the enemy that died)
        assert!((config.turn_reward(&history, id(0)) - 107.9).abs() < 1e-9);
        // unit 1: -0.1 - 5
        assert!((config.turn_reward(&history, id(1)) + 5.1).abs() < 1e-9);
        // bystander
        assert_eq!(config.turn_reward(&history, id(2)), 0.0);
    }

    #[test]
    fn turn_zero_has_no_reward() {
        let acc = RewardAccumulator::new(RewardConfig::default(), 0.9);
        assert_eq!(acc.reward(0, &busy_turn(), id(0)), 0.0);
    }

    #[test]
    fn discount_uses_previous_turn_exponent() {
        let acc = RewardAccumulator::new(RewardConfig::default(), 0.9);
        assert_eq!(acc.discount_at(1), 1.0);
        assert!((acc.discount_at(3) - 0.81).abs() < 1e-12);
    }

    #[test]
    fn fold_accumulates_and_reset_zeroes() {
        let mut acc = RewardAccumulator::new(RewardConfig::default(), 0.9);
        acc.register(id(0));
        acc.fold(id(0), 1.5);
        assert_eq!(acc.fold(id(0), 2.0), 3.5);

        acc.reset(id(0));
        assert_eq!(acc.get(id(0)), Some(0.0));

        acc.remove(id(0));
        assert_eq!(acc.get(id(0)), None);
    }

    #[test]
    fn attribution_parses_case_insensitively() {
        assert_eq!(
            " Unit ".parse::<RewardAttribution>().unwrap(),
            RewardAttribution::Unit
        );
        assert!("team".parse::<RewardAttribution>().is_err());
    }
}
