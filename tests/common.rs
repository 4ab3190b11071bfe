//! Common test utilities for the footman-rl test suite.
//!
//! Snapshot and controller builders shared by the integration tests.

#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use footman_rl::{
    EpisodeController, Side, UnitId,
    adapters::InMemoryWeightStore,
    app::RunConfig,
    battle::{BattleSnapshot, UnitView},
};

pub const WEIGHTS: &str = "weights.txt";

pub fn id(n: u32) -> UnitId {
    UnitId::new(n)
}

pub fn footman(n: u32, x: i32, y: i32, health: f64) -> UnitView {
    UnitView::new(id(n), Side::Friendly, "Footman", x, y, health)
}

pub fn enemy(n: u32, x: i32, y: i32, health: f64) -> UnitView {
    UnitView::new(id(n), Side::Enemy, "Footman", x, y, health)
}

/// Two footmen against two enemies, three tiles apart.
pub fn two_on_two(turn: u32) -> BattleSnapshot {
    BattleSnapshot::new(turn)
        .with_unit(footman(0, 0, 0, 50.0))
        .with_unit(footman(1, 0, 1, 50.0))
        .with_unit(enemy(10, 3, 0, 50.0))
        .with_unit(enemy(11, 3, 1, 50.0))
}

/// Controller backed by an in-memory store.
pub fn controller(config: RunConfig) -> (EpisodeController, InMemoryWeightStore) {
    let store = InMemoryWeightStore::new();
    let controller = EpisodeController::new(config, Arc::new(store.clone()));
    (controller, store)
}

/// Controller starting from the given weights.
pub fn controller_with_weights(
    config: RunConfig,
    weights: Vec<f64>,
) -> (EpisodeController, InMemoryWeightStore) {
    let store = InMemoryWeightStore::new().with_weights(Path::new(WEIGHTS), weights);
    let config = config.with_load_weights(true).with_weights_path(WEIGHTS);
    let controller = EpisodeController::new(config, Arc::new(store.clone()));
    (controller, store)
}
