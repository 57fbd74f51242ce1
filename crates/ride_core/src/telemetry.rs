//! Telemetry: completed rides and session counters.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::incidents::{IncidentCounters, Severity};
use crate::pricing::RideRecord;

/// Collects ride telemetry for the whole session.
#[derive(Debug, Clone, Default, Resource, Serialize)]
pub struct RideTelemetry {
    pub completed: Vec<RideRecord>,
    /// Riders spawned.
    pub rides_started: u32,
    /// Rides torn down with a live rider (death, off duty, shutdown).
    pub rides_aborted: u32,
    /// Incidents across all rides; unlike the per-ride counters these never reset.
    pub incidents: IncidentCounters,
    pub total_paid: i64,
}

impl RideTelemetry {
    pub fn record_ride(&mut self, record: RideRecord) {
        self.total_paid += record.total_paid();
        self.completed.push(record);
    }

    pub fn record_incident(&mut self, severity: Severity) {
        self.incidents.bump(severity);
    }

    pub fn average_rating(&self) -> Option<f32> {
        if self.completed.is_empty() {
            return None;
        }
        let sum: f32 = self.completed.iter().map(|record| record.rating).sum();
        Some(sum / self.completed.len() as f32)
    }
}
