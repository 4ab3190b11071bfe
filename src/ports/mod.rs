//! Ports (trait boundaries) for external dependencies.
//!
//! The controller only talks to the simulator, weight persistence, and
//! training observers through these traits; adapters in [`crate::adapters`]
//! and [`crate::pipeline`] provide the implementations.

pub mod observer;
pub mod simulator;
pub mod weight_store;

pub use observer::Observer;
pub use simulator::{BattleSimulator, TurnObservation};
pub use weight_store::WeightStore;
