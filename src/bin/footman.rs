//! footman - online Q-learning controller for footmen
//!
//! This CLI provides:
//! - Training with alternating TRAIN/TEST blocks against the skirmish engine
//! - Inspecting and initialising the weight file
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "footman")]
#[command(version, about = "Online Q-learning for footman target selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train footmen and print the learning curve
    Train(Box<footman_rl::cli::commands::train::TrainArgs>),

    /// Inspect or initialise the weight file
    Weights(footman_rl::cli::commands::weights::WeightsArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => footman_rl::cli::commands::train::execute(*args),
        Commands::Weights(args) => footman_rl::cli::commands::weights::execute(args),
    }
}
