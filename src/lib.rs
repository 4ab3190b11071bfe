//! Online reinforcement-learning controller for footman target selection
//!
//! This crate provides:
//! - A linear Q-function over hand-designed target features
//! - Event-driven discounted reward accounting per unit
//! - ε-greedy target selection with shared attack bookkeeping
//! - An episode controller alternating training and evaluation blocks
//! - Ports for the battle simulator and weight persistence, with a text
//!   weight file and a small grid skirmish engine as adapters

pub mod adapters;
pub mod app;
pub mod assignment;
pub mod battle;
pub mod cli;
pub mod controller;
pub mod error;
pub mod features;
pub mod identifiers;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_function;
pub mod report;
pub mod reward;
pub mod schedule;

pub use controller::{EpisodeController, EpisodeReport, EpisodeSummary};
pub use error::{Error, Result};
pub use identifiers::{Side, UnitId};
pub use schedule::Phase;
