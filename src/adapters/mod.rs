//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits defined in [`crate::ports`]:
//! plain-text and in-memory weight stores, and a small grid skirmish engine
//! that stands in for the external simulator.

pub mod in_memory_weight_store;
pub mod skirmish;
pub mod text_weight_store;

pub use in_memory_weight_store::InMemoryWeightStore;
pub use skirmish::{Skirmish, SkirmishConfig};
pub use text_weight_store::TextWeightStore;
