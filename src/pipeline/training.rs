//! Training pipeline driving simulator episodes through the controller

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    controller::{EpisodeController, EpisodeReport, EpisodeSummary},
    ports::{BattleSimulator, Observer},
    report::LearningCurve,
    schedule::Phase,
};

/// Result of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Episodes played, training and evaluation
    pub total_episodes: usize,

    /// Training episodes played
    pub train_episodes: usize,

    /// Episodes in which every enemy died
    pub wins: usize,

    pub learning_curve: LearningCurve,

    /// Weight vector at the end of the run
    pub final_weights: Vec<f64>,

    pub episodes: Vec<EpisodeSummary>,
}

impl RunResult {
    pub fn win_rate(&self) -> f64 {
        if self.total_episodes > 0 {
            self.wins as f64 / self.total_episodes as f64
        } else {
            0.0
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Plays episodes until the controller reports the run complete
#[derive(Default)]
pub struct TrainingPipeline {
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run the whole TRAIN/TEST schedule of `controller` against `simulator`
    pub fn run<S: BattleSimulator + ?Sized>(
        &mut self,
        controller: &mut EpisodeController,
        simulator: &mut S,
    ) -> Result<RunResult> {
        let counters = controller.counters();
        let planned = counters
            .schedule()
            .planned_episodes(counters.train_total());
        for observer in &mut self.observers {
            observer.on_run_start(planned)?;
        }

        let mut episodes = Vec::new();
        let mut wins = 0;
        let mut train_episodes = 0;

        while !controller.is_complete() {
            let episode = episodes.len();
            let phase = controller.phase();
            for observer in &mut self.observers {
                observer.on_episode_start(episode, phase)?;
            }

            let report = self.play_episode(episode, controller, simulator)?;
            if report.summary.won {
                wins += 1;
            }
            if report.transition.finished == Phase::Train {
                train_episodes += 1;
            }

            for observer in &mut self.observers {
                observer.on_episode_end(&report)?;
            }
            if let Some(record) = &report.transition.completed_block {
                for observer in &mut self.observers {
                    observer.on_test_block(record)?;
                }
            }

            episodes.push(report.summary);
        }

        let curve = controller.learning_curve().clone();
        for observer in &mut self.observers {
            observer.on_run_end(&curve)?;
        }

        Ok(RunResult {
            total_episodes: episodes.len(),
            train_episodes,
            wins,
            learning_curve: curve,
            final_weights: controller.weights().to_vec(),
            episodes,
        })
    }

    fn play_episode<S: BattleSimulator + ?Sized>(
        &mut self,
        episode: usize,
        controller: &mut EpisodeController,
        simulator: &mut S,
    ) -> Result<EpisodeReport> {
        let mut observation = simulator.reset(episode)?;
        let mut commands = controller.initial_step(&observation.snapshot, &observation.history);

        while !observation.terminal {
            observation = simulator.step(&commands)?;
            if !observation.terminal {
                commands = controller.middle_step(&observation.snapshot, &observation.history);
            }
        }

        Ok(controller.terminal_step(&observation.snapshot, &observation.history))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapters::{InMemoryWeightStore, Skirmish, SkirmishConfig},
        app::RunConfig,
        schedule::EvaluationSchedule,
    };

    #[test]
    fn test_training_pipeline() {
        let config = RunConfig::default()
            .with_episodes(4)
            .with_schedule(EvaluationSchedule::new(2, 1));
        let store = InMemoryWeightStore::new();
        let mut controller = EpisodeController::new(config, Arc::new(store.clone()));
        let mut simulator = Skirmish::new(SkirmishConfig::default().with_units_per_side(3).with_seed(42));

        let result = TrainingPipeline::new()
            .run(&mut controller, &mut simulator)
            .unwrap();

        assert_eq!(result.train_episodes, 4);
        assert_eq!(result.total_episodes, 6);
        assert_eq!(result.learning_curve.len(), 2);
        assert_eq!(store.save_count(), 4);
        assert_eq!(result.final_weights.len(), 5);
    }

    #[test]
    fn test_run_result_reloads_from_json() {
        let config = RunConfig::default()
            .with_episodes(1)
            .with_schedule(EvaluationSchedule::new(1, 1));
        let mut controller = EpisodeController::new(config, Arc::new(InMemoryWeightStore::new()));
        let mut simulator = Skirmish::new(SkirmishConfig::default().with_units_per_side(2).with_seed(7));
        let result = TrainingPipeline::new()
            .run(&mut controller, &mut simulator)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        result.save(&path).unwrap();
        let loaded = RunResult::load(&path).unwrap();

        assert_eq!(loaded.total_episodes, result.total_episodes);
        assert_eq!(loaded.learning_curve.len(), result.learning_curve.len());
        assert_eq!(loaded.episodes.len(), result.episodes.len());
        for (a, b) in loaded.final_weights.iter().zip(&result.final_weights) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
