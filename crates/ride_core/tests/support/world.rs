#![allow(dead_code)]

use std::sync::Arc;

use bevy_ecs::prelude::{Mut, World};
use ride_core::assignment::Assignment;
use ride_core::config::RideConfig;
use ride_core::geo::GeoPoint;
use ride_core::host::HostResource;
use ride_core::locations::LocationTable;
use ride_core::ride::{RideLifecycle, RideState};
use ride_core::session::{build_ride_world, SessionParams};
use ride_core::settings::{DriverSettings, DriverStats};
use ride_core::store::{MemoryStore, SettingsStore};
use ride_core::test_helpers::{line_table, FakeHost};

/// Builder configuration for reproducible test worlds.
pub struct TestWorldConfig {
    pub seed: u64,
    pub table: LocationTable,
    pub config: RideConfig,
    pub host: FakeHost,
    pub store: Box<dyn SettingsStore>,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            table: line_table(40, 20, 0.05),
            config: RideConfig::default(),
            host: FakeHost::new().with_driver_in_car(GeoPoint::default()),
            store: Box::new(MemoryStore::default()),
        }
    }
}

/// Populates the world with a fake host driving a car at the origin, a 40-entry
/// line table and an in-memory store.
#[derive(Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_table(mut self, table: LocationTable) -> Self {
        self.config.table = table;
        self
    }

    pub fn with_config(mut self, config: RideConfig) -> Self {
        self.config.config = config;
        self
    }

    pub fn with_host(mut self, host: FakeHost) -> Self {
        self.config.host = host;
        self
    }

    /// Store preloaded with `settings` and `stats`.
    pub fn with_profile(mut self, settings: DriverSettings, stats: DriverStats) -> Self {
        self.config.store = Box::new(MemoryStore::new(settings, stats));
        self
    }

    pub fn with_store(mut self, store: Box<dyn SettingsStore>) -> Self {
        self.config.store = store;
        self
    }

    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            table,
            config,
            host,
            store,
        } = self.config;
        build_ride_world(
            host,
            Arc::new(table),
            store,
            SessionParams::default().with_seed(seed).with_config(config),
        )
    }
}

pub fn host(world: &World) -> &FakeHost {
    &world.resource::<HostResource<FakeHost>>().0
}

pub fn host_mut(world: &mut World) -> Mut<'_, HostResource<FakeHost>> {
    world.resource_mut::<HostResource<FakeHost>>()
}

pub fn lifecycle(world: &World) -> &RideLifecycle {
    world.resource::<RideLifecycle>()
}

pub fn state(world: &World) -> RideState {
    lifecycle(world).state
}

pub fn trip(world: &World) -> Assignment {
    lifecycle(world).trip.expect("committed trip")
}
