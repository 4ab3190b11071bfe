//! Battle model consumed from the turn-based simulator

pub mod history;
pub mod snapshot;

pub use history::{ActionFeedback, AttackCommand, DamageLog, DeathLog, TurnHistory};
pub use snapshot::{BattleSnapshot, UnitView};
