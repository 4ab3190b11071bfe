//! Subcommands of the `footman` binary

pub mod train;
pub mod weights;
