//! Logs describing what happened during one simulator turn

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifiers::{Side, UnitId};

/// Result the simulator reports for a unit's standing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFeedback {
    /// The command finished (e.g. the target died)
    Completed,
    /// The command could not be carried out (no path, target gone)
    Failed,
    /// Still in progress
    Incomplete,
}

impl ActionFeedback {
    /// Whether the unit is free to receive a new command.
    pub fn is_finished(self) -> bool {
        matches!(self, ActionFeedback::Completed | ActionFeedback::Failed)
    }
}

/// Compound attack: move into range of `target` and strike until it dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackCommand {
    pub attacker: UnitId,
    pub target: UnitId,
}

impl AttackCommand {
    pub fn new(attacker: UnitId, target: UnitId) -> Self {
        Self { attacker, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageLog {
    pub attacker: UnitId,
    pub attacker_side: Side,
    pub defender: UnitId,
    pub defender_side: Side,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathLog {
    pub unit: UnitId,
    pub side: Side,
}

/// Everything logged for a single turn.
///
/// The controller always receives the history of the turn *before* the one it
/// is deciding for; on turn 0 that history is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnHistory {
    /// Damage dealt during the turn, both sides
    pub damage: Vec<DamageLog>,
    /// Units that died during the turn, both sides
    pub deaths: Vec<DeathLog>,
    /// Feedback for friendly units' standing commands
    pub feedback: BTreeMap<UnitId, ActionFeedback>,
    /// Commands issued to friendly units during the turn
    pub commands_issued: BTreeMap<UnitId, AttackCommand>,
}

impl TurnHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// An "event" turn: at least one death or one damage instance.
    pub fn has_event(&self) -> bool {
        !self.deaths.is_empty() || !self.damage.is_empty()
    }

    pub fn feedback_for(&self, unit: UnitId) -> Option<ActionFeedback> {
        self.feedback.get(&unit).copied()
    }

    pub fn with_damage(
        mut self,
        attacker: (Side, UnitId),
        defender: (Side, UnitId),
        amount: f64,
    ) -> Self {
        self.damage.push(DamageLog {
            attacker: attacker.1,
            attacker_side: attacker.0,
            defender: defender.1,
            defender_side: defender.0,
            amount,
        });
        self
    }

    pub fn with_death(mut self, side: Side, unit: UnitId) -> Self {
        self.deaths.push(DeathLog { unit, side });
        self
    }

    pub fn with_feedback(mut self, unit: UnitId, feedback: ActionFeedback) -> Self {
        self.feedback.insert(unit, feedback);
        self
    }

    pub fn with_command(mut self, command: AttackCommand) -> Self {
        self.commands_issued.insert(command.attacker, command);
        self
    }
}
