//! Tick time and the per-tick host snapshot.
//!
//! There is no wall clock: the host reports how much simulated time passed
//! since the previous tick and every timer accumulates those deltas.

use bevy_ecs::prelude::Resource;

use crate::host::{DriverView, VehicleId};

#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct TickClock {
    delta_secs: f32,
    elapsed_secs: f64,
    ticks: u64,
}

impl TickClock {
    /// Start a new tick. Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta_secs: f32) {
        let delta_secs = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };
        self.delta_secs = delta_secs;
        self.elapsed_secs += f64::from(delta_secs);
        self.ticks += 1;
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta_secs
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Driver snapshot sampled from the host once at the start of a tick.
#[derive(Debug, Clone, Default, Resource)]
pub struct FrameInput {
    pub driver: DriverView,
}

impl FrameInput {
    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.driver.vehicle.as_ref().map(|vehicle| vehicle.id)
    }
}
