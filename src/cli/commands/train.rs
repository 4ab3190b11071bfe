//! Train command - run the TRAIN/TEST schedule against the skirmish engine

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use serde::Serialize;

use crate::{
    adapters::{Skirmish, SkirmishConfig},
    app::{App, RunConfig},
    cli::output::{format_number, format_rate, print_kv, print_section},
    controller::EpisodeReport,
    pipeline::{
        JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, RunResult,
        TrainingPipeline,
    },
    ports::Observer,
    reward::RewardAttribution,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    run: &'a RunResult,
    config: &'a RunConfig,
    simulator: &'a SkirmishConfig,
    metrics: Option<MetricsSummary>,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train footmen with online Q-learning")]
pub struct TrainArgs {
    /// Number of training episodes (default 10)
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Start from the stored weight file (default false)
    #[arg(long, value_name = "BOOL")]
    pub load_weights: Option<bool>,

    /// Weight file location
    #[arg(long, short = 'w')]
    pub weights: Option<PathBuf>,

    /// JSON run configuration; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Seed for initial weights and exploration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Step size α
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub discount: Option<f64>,

    /// Reward attribution (side or unit)
    #[arg(long)]
    pub attribution: Option<String>,

    /// Footmen per side in the skirmish
    #[arg(long, default_value_t = 5)]
    pub units_per_side: u32,

    /// Turn limit per episode
    #[arg(long, default_value_t = 400)]
    pub max_turns: u32,

    /// Seed for the skirmish engine (defaults to the learner seed)
    #[arg(long)]
    pub sim_seed: Option<u64>,

    /// Optional file for JSONL episode records
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional path for the learning curve as CSV
    #[arg(long)]
    pub curve_csv: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Merge the config file (if any) with the flags.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => {
                if self.episodes.is_none() {
                    warn!("--episodes not given; defaulting to 10 training episodes");
                }
                if self.load_weights.is_none() {
                    warn!("--load-weights not given; starting from random weights");
                }
                RunConfig::default()
            }
        };

        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(load) = self.load_weights {
            config.load_weights = load;
        }
        if let Some(path) = &self.weights {
            config.weights_path = path.clone();
        }
        if let Some(seed) = self.seed {
            config.learning.seed = seed;
        }
        if let Some(epsilon) = self.epsilon {
            config.learning.epsilon = epsilon;
        }
        if let Some(rate) = self.learning_rate {
            config.learning.learning_rate = rate;
        }
        if let Some(discount) = self.discount {
            config.learning.discount = discount;
        }
        if let Some(raw) = &self.attribution {
            config.reward.attribution = raw.parse::<RewardAttribution>()?;
        }
        Ok(config)
    }

    fn simulator_config(&self, config: &RunConfig) -> SkirmishConfig {
        SkirmishConfig::default()
            .with_units_per_side(self.units_per_side)
            .with_max_turns(self.max_turns)
            .with_seed(self.sim_seed.unwrap_or(config.learning.seed))
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.run_config()?;
    let sim_config = args.simulator_config(&config);

    let app = App::new();
    let mut controller = app
        .create_controller(config.clone())
        .context("Failed to create controller")?;
    let mut simulator = Skirmish::new(sim_config.clone());

    let mut pipeline = TrainingPipeline::new();
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    pipeline = pipeline.with_observer(Box::new(SharedMetrics(Arc::clone(&metrics))));

    let result = pipeline
        .run(&mut controller, &mut simulator)
        .context("Training run failed")?;
    let metrics = metrics.lock().map(|m| m.summary()).ok();

    print_section("Training complete");
    print_kv("Training episodes", &format_number(result.train_episodes));
    print_kv("Total episodes", &format_number(result.total_episodes));
    print_kv("Win rate", &format_rate(result.win_rate()));
    print_kv("Weights", &config.weights_path.display().to_string());
    println!();
    print!("{}", result.learning_curve);

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let summary = TrainingSummaryFile {
            run: &result,
            config: &config,
            simulator: &sim_config,
            metrics,
        };
        serde_json::to_writer_pretty(file, &summary)?;
    }

    if let Some(path) = &args.curve_csv {
        result
            .learning_curve
            .save_csv(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Lets the command read metrics back after the pipeline consumed the
/// observer box.
struct SharedMetrics(Arc<Mutex<MetricsObserver>>);

impl Observer for SharedMetrics {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> crate::Result<()> {
        let mut metrics = self.0.lock().map_err(|_| crate::Error::Observer {
            message: "metrics lock poisoned".to_string(),
        })?;
        metrics.on_episode_end(report)
    }
}
