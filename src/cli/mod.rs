//! CLI infrastructure for the footman controller
//!
//! This module provides the command-line interface for training footmen and
//! managing their weight file.

pub mod commands;
pub mod output;
