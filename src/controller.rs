//! Per-turn orchestration of the learning footmen
//!
//! The simulator calls [`EpisodeController::initial_step`] on turn 0,
//! [`EpisodeController::middle_step`] on every following turn, and
//! [`EpisodeController::terminal_step`] once the episode is over. The first
//! two resolve the previous turn's deaths, fold rewards into the per-unit
//! accumulators, apply weight updates on event turns while training, and
//! hand out new attack orders to units whose order is done. The terminal
//! call only closes the episode.

use std::{collections::BTreeSet, sync::Arc};

use log::{debug, error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    app::RunConfig,
    assignment::AttackAssignments,
    battle::{ActionFeedback, AttackCommand, BattleSnapshot, TurnHistory},
    features::{FeatureContext, FeatureExtractor, TargetFeatures},
    identifiers::{Side, UnitId},
    policy::EpsilonGreedyPolicy,
    ports::WeightStore,
    q_function::LinearQFunction,
    report::LearningCurve,
    reward::RewardAccumulator,
    schedule::{EpisodeCounters, Phase, PhaseTransition},
};

/// Outcome of one episode as seen by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based episode index within the run
    pub index: usize,
    pub phase: Phase,
    /// Turn number of the terminal observation
    pub turns: u32,
    /// Weight updates applied during the episode
    pub updates: usize,
    /// Attack commands issued
    pub commands: usize,
    /// Discounted reward summed over all controlled units
    pub reward: f64,
    /// Controlled units alive at the end
    pub survivors: usize,
    /// Every enemy died while at least one controlled unit survived
    pub won: bool,
}

/// What [`EpisodeController::terminal_step`] returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    pub summary: EpisodeSummary,
    pub transition: PhaseTransition,
}

#[derive(Debug, Clone, Copy, Default)]
struct EpisodeStats {
    updates: usize,
    commands: usize,
    reward: f64,
}

/// Online Q-learning controller for a group of footmen.
pub struct EpisodeController {
    config: RunConfig,
    q: LinearQFunction,
    extractor: Box<dyn FeatureExtractor + Send + Sync>,
    policy: EpsilonGreedyPolicy,
    rewards: RewardAccumulator,
    assignments: AttackAssignments,
    friendly: BTreeSet<UnitId>,
    enemy: BTreeSet<UnitId>,
    counters: EpisodeCounters,
    store: Arc<dyn WeightStore + Send + Sync>,
    rng: StdRng,
    episodes_started: usize,
    stats: EpisodeStats,
}

impl EpisodeController {
    /// Controller using the default five-feature extractor.
    pub fn new(config: RunConfig, store: Arc<dyn WeightStore + Send + Sync>) -> Self {
        Self::with_extractor(config, store, Box::new(TargetFeatures::default()))
    }

    /// Controller with a custom feature set.
    ///
    /// Weights start uniformly random in `[-1, 1)`. When `load_weights` is set
    /// the stored vector replaces them; a missing or unreadable file is logged
    /// and the random weights are kept.
    pub fn with_extractor(
        config: RunConfig,
        store: Arc<dyn WeightStore + Send + Sync>,
        extractor: Box<dyn FeatureExtractor + Send + Sync>,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(config.learning.seed);
        let learning = config.learning;
        let mut q = LinearQFunction::random(extractor.feature_count(), learning.learning_rate, &mut rng);

        if config.load_weights {
            match store.load(&config.weights_path) {
                Ok(weights) => match q.set_weights(weights) {
                    Ok(()) => info!("loaded weights from {}", config.weights_path.display()),
                    Err(err) => error!("ignoring stored weights: {err}"),
                },
                Err(err @ Error::MissingWeights { .. }) => {
                    warn!("{err}; starting from random weights")
                }
                Err(err) => error!("failed to load weights: {err}; starting from random weights"),
            }
        }

        Self {
            policy: EpsilonGreedyPolicy::new(learning.epsilon),
            rewards: RewardAccumulator::new(config.reward, learning.discount),
            counters: EpisodeCounters::new(config.schedule, config.episodes),
            config,
            q,
            extractor,
            assignments: AttackAssignments::new(),
            friendly: BTreeSet::new(),
            enemy: BTreeSet::new(),
            store,
            rng,
            episodes_started: 0,
            stats: EpisodeStats::default(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.counters.phase()
    }

    pub fn counters(&self) -> &EpisodeCounters {
        &self.counters
    }

    pub fn learning_curve(&self) -> &LearningCurve {
        self.counters.learning_curve()
    }

    pub fn is_complete(&self) -> bool {
        self.counters.is_complete()
    }

    pub fn weights(&self) -> &[f64] {
        self.q.weights()
    }

    pub fn assignments(&self) -> &AttackAssignments {
        &self.assignments
    }

    /// Discounted reward accumulated by `unit` since its last update
    pub fn accumulated_reward(&self, unit: UnitId) -> Option<f64> {
        self.rewards.get(unit)
    }

    pub fn friendly_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.friendly.iter().copied()
    }

    pub fn enemy_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.enemy.iter().copied()
    }

    /// Replace the current weights with the stored vector.
    pub fn reload_weights(&mut self) -> Result<()> {
        let weights = self.store.load(&self.config.weights_path)?;
        self.q.set_weights(weights)
    }

    /// First turn of an episode: build rosters and issue the opening orders.
    pub fn initial_step(
        &mut self,
        snapshot: &BattleSnapshot,
        history: &TurnHistory,
    ) -> Vec<AttackCommand> {
        self.begin_episode(snapshot);
        self.settle_turn(snapshot, history)
    }

    /// Any turn after the first while the episode is running.
    pub fn middle_step(
        &mut self,
        snapshot: &BattleSnapshot,
        history: &TurnHistory,
    ) -> Vec<AttackCommand> {
        self.settle_turn(snapshot, history)
    }

    /// Last observation of an episode.
    ///
    /// Bookkeeping only: the final turn's deaths update the rosters for the
    /// summary, but its reward is never credited and no weight update runs.
    /// Advances the TRAIN/TEST schedule and persists the weights after a
    /// training episode. A failed save is logged and the run continues.
    pub fn terminal_step(&mut self, snapshot: &BattleSnapshot, history: &TurnHistory) -> EpisodeReport {
        self.apply_deaths(history);

        let transition = self.counters.finish_episode();
        if transition.finished == Phase::Train {
            self.persist_weights();
        }

        let summary = EpisodeSummary {
            index: self.episodes_started.saturating_sub(1),
            phase: transition.finished,
            turns: snapshot.turn(),
            updates: self.stats.updates,
            commands: self.stats.commands,
            reward: self.stats.reward,
            survivors: self.friendly.len(),
            won: self.enemy.is_empty() && !self.friendly.is_empty(),
        };
        info!(
            "episode {} ({}) ended after {} turns: {} survivors, reward {:.2}, {} updates",
            summary.index, summary.phase, summary.turns, summary.survivors, summary.reward, summary.updates
        );
        if let Some(record) = &transition.completed_block {
            info!(
                "evaluation after {} training episodes: average reward {:.2}",
                record.episodes_played, record.average_reward
            );
        }
        if transition.run_complete {
            info!("training total of {} episodes reached", self.counters.train_total());
        }

        self.assignments.clear();
        self.rewards.clear();
        self.friendly.clear();
        self.enemy.clear();

        EpisodeReport {
            summary,
            transition,
        }
    }

    fn begin_episode(&mut self, snapshot: &BattleSnapshot) {
        self.assignments.clear();
        self.rewards.clear();
        self.friendly.clear();
        self.enemy.clear();
        self.stats = EpisodeStats::default();
        self.episodes_started += 1;

        let kind = self.config.unit_kind.as_str();
        for side in [Side::Friendly, Side::Enemy] {
            for unit in snapshot.units(side).values() {
                if !unit.is_kind(kind) {
                    warn!("ignoring {side} unit {} of type '{}'", unit.id, unit.kind);
                    continue;
                }
                match side {
                    Side::Friendly => {
                        self.friendly.insert(unit.id);
                        self.rewards.register(unit.id);
                    }
                    Side::Enemy => {
                        self.enemy.insert(unit.id);
                        self.assignments.track(unit.id);
                    }
                }
            }
        }

        info!(
            "episode {} ({}): {} footmen against {} enemies",
            self.episodes_started - 1,
            self.counters.phase(),
            self.friendly.len(),
            self.enemy.len()
        );
    }

    fn settle_turn(&mut self, snapshot: &BattleSnapshot, history: &TurnHistory) -> Vec<AttackCommand> {
        let turn = snapshot.turn();
        self.apply_deaths(history);

        let event = turn > 0 && history.has_event();
        let discount = self.rewards.discount_at(turn);
        let phase = self.counters.phase();
        let mut commands = Vec::new();

        let units: Vec<UnitId> = self.friendly.iter().copied().collect();
        for unit in units {
            let discounted = self.rewards.reward(turn, history, unit) * discount;
            let accumulated = self.rewards.fold(unit, discounted);
            self.stats.reward += discounted;

            match phase {
                Phase::Test => self.counters.add_test_reward(discounted),
                Phase::Train if event => {
                    let target = self.assignments.target_of(unit);
                    let ctx = FeatureContext::new(snapshot, &self.assignments);
                    let features = self.extractor.extract(&ctx, unit, target);
                    self.q.update(&features, accumulated);
                    self.rewards.reset(unit);
                    self.stats.updates += 1;
                }
                Phase::Train => {}
            }

            if self.needs_command(turn, history, unit)
                && let Some(command) = self.choose_target(snapshot, unit)
            {
                commands.push(command);
            }
        }

        commands
    }

    fn apply_deaths(&mut self, history: &TurnHistory) {
        for death in &history.deaths {
            match death.side {
                Side::Friendly => {
                    if self.friendly.remove(&death.unit) {
                        self.assignments.on_friendly_death(death.unit);
                        self.rewards.remove(death.unit);
                        debug!("footman {} died", death.unit);
                    }
                }
                Side::Enemy => {
                    if self.enemy.remove(&death.unit) {
                        self.assignments.on_enemy_death(death.unit);
                        debug!("enemy {} died", death.unit);
                    }
                }
            }
        }
    }

    fn needs_command(&self, turn: u32, history: &TurnHistory, unit: UnitId) -> bool {
        turn == 0
            || self.assignments.target_of(unit).is_none()
            || history
                .feedback_for(unit)
                .is_none_or(ActionFeedback::is_finished)
    }

    fn choose_target(&mut self, snapshot: &BattleSnapshot, unit: UnitId) -> Option<AttackCommand> {
        let candidates: Vec<UnitId> = self
            .enemy
            .iter()
            .copied()
            .filter(|&enemy| self.assignments.is_tracked(enemy))
            .collect();

        let ctx = FeatureContext::new(snapshot, &self.assignments);
        let target = self.policy.select(
            &self.q,
            self.extractor.as_ref(),
            &ctx,
            unit,
            &candidates,
            &mut self.rng,
        )?;

        self.assignments.assign(unit, target);
        self.stats.commands += 1;
        debug!("footman {unit} attacks {target}");
        Some(AttackCommand::new(unit, target))
    }

    fn persist_weights(&self) {
        let path = &self.config.weights_path;
        match self.store.save(self.q.weights(), path) {
            Ok(()) => debug!("saved weights to {}", path.display()),
            Err(err) => error!("failed to save weights to {}: {err}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        adapters::InMemoryWeightStore,
        battle::UnitView,
        schedule::EvaluationSchedule,
    };

    fn id(n: u32) -> UnitId {
        UnitId::new(n)
    }

    fn field(turn: u32) -> BattleSnapshot {
        BattleSnapshot::new(turn)
            .with_unit(UnitView::new(id(0), Side::Friendly, "Footman", 0, 0, 50.0))
            .with_unit(UnitView::new(id(1), Side::Friendly, "Footman", 0, 1, 50.0))
            .with_unit(UnitView::new(id(10), Side::Enemy, "Footman", 3, 0, 50.0))
            .with_unit(UnitView::new(id(11), Side::Enemy, "Footman", 3, 1, 50.0))
    }

    fn controller(config: RunConfig) -> (EpisodeController, InMemoryWeightStore) {
        let store = InMemoryWeightStore::new();
        let controller = EpisodeController::new(config, Arc::new(store.clone()));
        (controller, store)
    }

    #[test]
    fn opening_turn_orders_every_footman() {
        let (mut ctl, _) = controller(RunConfig::default());
        let commands = ctl.initial_step(&field(0), &TurnHistory::new());

        assert_eq!(commands.len(), 2);
        for command in &commands {
            assert_eq!(ctl.assignments().target_of(command.attacker), Some(command.target));
        }
    }

    #[test]
    fn incomplete_orders_are_left_alone() {
        let (mut ctl, _) = controller(RunConfig::default());
        ctl.initial_step(&field(0), &TurnHistory::new());

        let history = TurnHistory::new()
            .with_feedback(id(0), ActionFeedback::Incomplete)
            .with_feedback(id(1), ActionFeedback::Completed);
        let commands = ctl.middle_step(&field(1), &history);

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].attacker, id(1));
    }

    #[test]
    fn other_unit_kinds_are_not_controlled() {
        let (mut ctl, _) = controller(RunConfig::default());
        let snapshot = field(0).with_unit(UnitView::new(id(5), Side::Friendly, "Archer", 0, 2, 30.0));
        let commands = ctl.initial_step(&snapshot, &TurnHistory::new());

        assert_eq!(ctl.friendly_units().count(), 2);
        assert!(commands.iter().all(|c| c.attacker != id(5)));
    }

    #[test]
    fn training_episode_persists_weights() {
        let (mut ctl, store) = controller(RunConfig::default());
        ctl.initial_step(&field(0), &TurnHistory::new());
        let report = ctl.terminal_step(&field(1), &TurnHistory::new());

        assert_eq!(report.summary.phase, Phase::Train);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_episode_does_not_persist() {
        let config = RunConfig::default()
            .with_episodes(0)
            .with_schedule(EvaluationSchedule::new(10, 1));
        let (mut ctl, store) = controller(config);
        ctl.initial_step(&field(0), &TurnHistory::new());
        let report = ctl.terminal_step(&field(1), &TurnHistory::new());

        assert_eq!(report.summary.phase, Phase::Test);
        assert!(report.transition.run_complete);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn stored_weights_are_loaded() {
        let weights = vec![0.5, -0.25, 1.0, 2.0, -3.0];
        let store = InMemoryWeightStore::new().with_weights(Path::new("w.txt"), weights.clone());
        let config = RunConfig::default()
            .with_load_weights(true)
            .with_weights_path("w.txt");

        let ctl = EpisodeController::new(config, Arc::new(store));
        assert_eq!(ctl.weights(), weights.as_slice());
    }

    #[test]
    fn missing_weights_fall_back_to_random() {
        let config = RunConfig::default().with_load_weights(true);
        let (ctl, _) = controller(config);

        assert_eq!(ctl.weights().len(), 5);
        assert!(ctl.weights().iter().all(|w| (-1.0..1.0).contains(w)));
    }

    #[test]
    fn wrong_length_weights_are_ignored() {
        let store = InMemoryWeightStore::new().with_weights(Path::new("w.txt"), vec![1.0, 2.0]);
        let config = RunConfig::default()
            .with_load_weights(true)
            .with_weights_path("w.txt");

        let ctl = EpisodeController::new(config, Arc::new(store));
        assert_eq!(ctl.weights().len(), 5);
    }
}
