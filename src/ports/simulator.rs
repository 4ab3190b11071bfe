//! Simulator port - the turn-based engine the controller plays against

use crate::{
    Result,
    battle::{AttackCommand, BattleSnapshot, TurnHistory},
};

/// What the simulator reports at the start of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnObservation {
    /// State of every unit at the start of the turn
    pub snapshot: BattleSnapshot,
    /// Logs of the turn that just finished (empty on turn 0)
    pub history: TurnHistory,
    /// Whether the episode is over
    pub terminal: bool,
}

/// Turn-based engine owning positions, health, and combat resolution.
///
/// The controller is invoked once per turn and must return its commands
/// before the next turn begins; simulators never call back into it.
pub trait BattleSimulator {
    /// Start a new episode and return its turn-0 observation.
    fn reset(&mut self, episode: usize) -> Result<TurnObservation>;

    /// Apply `commands` for the current turn, resolve it, and observe the
    /// next one.
    fn step(&mut self, commands: &[AttackCommand]) -> Result<TurnObservation>;
}
