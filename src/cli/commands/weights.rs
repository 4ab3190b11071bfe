//! Weights command - inspect or initialise the stored weight vector

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    adapters::text_weight_store::DEFAULT_WEIGHTS_PATH,
    app::App,
    cli::output::{print_section, weight_line},
    features::NUM_FEATURES,
    q_function::LinearQFunction,
};

const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "distance",
    "defender health",
    "attacker health",
    "attackers on defender",
    "already committed",
];

#[derive(Parser, Debug)]
#[command(about = "Inspect or initialise the weight file")]
pub struct WeightsArgs {
    /// Weight file location
    #[arg(long, short = 'w', default_value = DEFAULT_WEIGHTS_PATH)]
    pub path: PathBuf,

    #[command(subcommand)]
    pub action: WeightsAction,
}

#[derive(Subcommand, Debug)]
pub enum WeightsAction {
    /// Print the stored weights
    Show,

    /// Write a fresh random weight vector
    Init {
        /// Seed for the random weights
        #[arg(long, default_value_t = 12345)]
        seed: u64,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

pub fn execute(args: WeightsArgs) -> Result<()> {
    let app = App::new();

    match args.action {
        WeightsAction::Show => {
            let weights = app
                .load_weights(&args.path)
                .with_context(|| format!("Failed to read {}", args.path.display()))?;

            print_section(&format!("Weights ({})", args.path.display()));
            for (idx, weight) in weights.iter().enumerate() {
                let name = FEATURE_NAMES.get(idx).copied().unwrap_or("?");
                println!("{}", weight_line(idx, name, *weight));
            }
        }
        WeightsAction::Init { seed, force } => {
            if args.path.exists() && !force {
                return Err(anyhow!(
                    "{} already exists; pass --force to overwrite",
                    args.path.display()
                ));
            }

            let mut rng = StdRng::seed_from_u64(seed);
            let q = LinearQFunction::random(NUM_FEATURES, 0.0, &mut rng);
            app.save_weights(q.weights(), &args.path)
                .with_context(|| format!("Failed to write {}", args.path.display()))?;
            println!("Wrote {} random weights to {}", NUM_FEATURES, args.path.display());
        }
    }

    Ok(())
}
