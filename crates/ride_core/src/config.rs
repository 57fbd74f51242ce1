use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::incidents::SeverityBands;
use crate::pricing::DistancePolicy;

/// Tunables for the ride loop. Distances in miles are compared against oracle
/// distances after unit conversion; radii are in host units.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    /// Candidates evaluated per scan phase per tick.
    pub scan_quota: usize,
    pub min_pickup_miles: f32,
    pub max_pickup_miles: f32,
    pub min_dropoff_miles: f32,
    /// Driver must be closer than this to a marker to trigger pickup/drop-off.
    pub activation_radius: f32,
    /// Markers are only drawn within this distance of the driver.
    pub marker_visibility_radius: f32,
    pub distance_fallback_threshold_miles: f32,
    pub boarding_timeout_secs: f32,
    pub incident_cooldown_secs: f32,
    pub route_refresh_secs: f32,
    /// Vehicle controls stay restricted this long after drop-off.
    pub dropoff_control_lock_secs: f32,
    /// A new search may start this long after drop-off.
    pub dropoff_reset_secs: f32,
    /// Vehicle speeds at or below this count as stationary.
    pub stationary_speed: f32,
    pub incident_min_speed: f32,
    pub incident_small_max_speed: f32,
    pub incident_medium_max_speed: f32,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            scan_quota: 20,
            min_pickup_miles: 0.1,
            max_pickup_miles: 0.4,
            min_dropoff_miles: 0.5,
            activation_radius: 3.0,
            marker_visibility_radius: 200.0,
            distance_fallback_threshold_miles: 10.0,
            boarding_timeout_secs: 10.0,
            incident_cooldown_secs: 3.0,
            route_refresh_secs: 1.0,
            dropoff_control_lock_secs: 3.0,
            dropoff_reset_secs: 5.0,
            stationary_speed: 0.0,
            incident_min_speed: 0.5,
            incident_small_max_speed: 15.0,
            incident_medium_max_speed: 30.0,
        }
    }
}

impl RideConfig {
    pub fn severity_bands(&self) -> SeverityBands {
        SeverityBands {
            min_speed: self.incident_min_speed,
            small_max: self.incident_small_max_speed,
            medium_max: self.incident_medium_max_speed,
        }
    }

    pub fn distance_policy(&self) -> DistancePolicy {
        DistancePolicy {
            fallback_threshold_miles: self.distance_fallback_threshold_miles,
        }
    }

    pub fn is_stationary(&self, speed: f32) -> bool {
        speed <= self.stationary_speed
    }
}
