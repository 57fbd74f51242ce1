//! Session setup: inserts every resource the ride schedule reads.

use std::sync::Arc;

use bevy_ecs::prelude::{Resource, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::{FrameInput, TickClock};
use crate::config::RideConfig;
use crate::host::{HostResource, RideHost};
use crate::locations::LocationTable;
use crate::notice::Notice;
use crate::ride::{DutyStatus, RideLifecycle, TickPredicates};
use crate::settings::{DriverSettings, DriverStats};
use crate::store::{SettingsStore, StoreError, StoreResource};
use crate::systems::markers::MarkersDrawn;
use crate::telemetry::RideTelemetry;

/// Randomness for candidate selection. Seeded runs are reproducible.
#[derive(Resource)]
pub struct RideRng(pub StdRng);

impl RideRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionParams {
    #[serde(default)]
    pub config: RideConfig,
    /// Seed for [RideRng]; `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SessionParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_config(mut self, config: RideConfig) -> Self {
        self.config = config;
        self
    }
}

/// Builds a world ready for [crate::runner::run_tick]. Settings and stats come
/// from `store`; if either cannot be read the defaults are used and the driver
/// is told.
pub fn build_ride_world<H: RideHost>(
    mut host: H,
    table: Arc<LocationTable>,
    store: Box<dyn SettingsStore>,
    params: SessionParams,
) -> World {
    let settings = load_or_default(&mut host, "settings", store.load_settings());
    let stats = load_or_default(&mut host, "stats", store.load_stats());
    let config = params.config;

    let mut world = World::new();
    world.insert_resource(RideLifecycle::new(table, &config));
    world.insert_resource(config);
    world.insert_resource(settings);
    world.insert_resource(stats);
    world.insert_resource(StoreResource::new(store));
    world.insert_resource(RideRng::new(params.seed));
    world.insert_resource(TickClock::default());
    world.insert_resource(FrameInput::default());
    world.insert_resource(TickPredicates::default());
    world.insert_resource(MarkersDrawn::default());
    world.insert_resource(RideTelemetry::default());
    world.insert_resource(DutyStatus::default());
    world.insert_resource(HostResource(host));
    world
}

fn load_or_default<H: RideHost, T: Default>(
    host: &mut H,
    what: &str,
    loaded: Result<T, StoreError>,
) -> T {
    loaded.unwrap_or_else(|err| {
        warn!(%err, what, "could not load, using defaults");
        host.notify(Notice::StoreFailure(err.to_string()));
        T::default()
    })
}
