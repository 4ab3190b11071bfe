//! Run pipeline abstractions
//!
//! This module provides:
//! - The episode loop connecting a simulator to the controller
//! - Observers recording progress, metrics and JSONL traces

pub mod observers;
pub mod training;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, RunEvent};
pub use training::{RunResult, TrainingPipeline};

pub use crate::ports::Observer;
