//! Collision incidents recorded while a rider is onboard.

use serde::Serialize;

use crate::debounce::ElapsedDebounce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Small,
    Medium,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IncidentCounters {
    pub small: u32,
    pub medium: u32,
    pub big: u32,
}

impl IncidentCounters {
    pub fn total(&self) -> u32 {
        self.small + self.medium + self.big
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Small => self.small += 1,
            Severity::Medium => self.medium += 1,
            Severity::Big => self.big += 1,
        }
    }
}

/// Speed thresholds (host speed units) separating the severity buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityBands {
    /// Collisions below this speed are ignored.
    pub min_speed: f32,
    /// Upper bound (inclusive) of a small incident.
    pub small_max: f32,
    /// Upper bound (inclusive) of a medium incident; anything faster is big.
    pub medium_max: f32,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            min_speed: 0.5,
            small_max: 15.0,
            medium_max: 30.0,
        }
    }
}

impl SeverityBands {
    pub fn classify(&self, speed: f32) -> Option<Severity> {
        if speed < self.min_speed {
            None
        } else if speed <= self.small_max {
            Some(Severity::Small)
        } else if speed <= self.medium_max {
            Some(Severity::Medium)
        } else {
            Some(Severity::Big)
        }
    }
}

/// Debounced collision counter. At most one incident is recorded per
/// cooldown window regardless of how many ticks report a collision.
#[derive(Debug, Clone)]
pub struct IncidentTracker {
    counters: IncidentCounters,
    cooldown: ElapsedDebounce,
    bands: SeverityBands,
}

impl IncidentTracker {
    pub fn new(cooldown_secs: f32, bands: SeverityBands) -> Self {
        Self {
            counters: IncidentCounters::default(),
            cooldown: ElapsedDebounce::new(cooldown_secs),
            bands,
        }
    }

    pub fn counters(&self) -> IncidentCounters {
        self.counters
    }

    pub fn cooldown_active(&self) -> bool {
        self.cooldown.is_active()
    }

    /// Feed one tick of telemetry. `monitoring` is true while the rider is
    /// onboard, unpaid and riding with the driver. Returns the severity of the
    /// incident recorded this tick, if any.
    pub fn observe(
        &mut self,
        monitoring: bool,
        speed: f32,
        collided: bool,
        delta_secs: f32,
    ) -> Option<Severity> {
        let mut recorded = None;
        if monitoring && collided && !self.cooldown.is_active() {
            if let Some(severity) = self.bands.classify(speed) {
                self.counters.bump(severity);
                self.cooldown.arm();
                recorded = Some(severity);
            }
        }
        self.cooldown.advance(delta_secs);
        recorded
    }

    /// Counters are handed to [crate::pricing::compute_rating], which zeroes them.
    pub fn counters_mut(&mut self) -> &mut IncidentCounters {
        &mut self.counters
    }

    pub fn reset(&mut self) {
        self.counters = IncidentCounters::default();
        self.cooldown.reset();
    }
}
