//! Location assignment: picks a (pickup, drop-off) pair from the location
//! table without ever evaluating more than `scan_quota` candidates per scan
//! phase in one tick.
//!
//! Two resumable scans share one cursor:
//!
//! 1. **Pickup**: travel distance from the observer to every spawn point. Spawn
//!    points inside the pickup band are candidates; the closest spawn point seen
//!    is kept as a fallback for an empty band.
//! 2. **Drop-off**: travel distance from the chosen spawn point to every marker.
//!    Markers at least the minimum distance away, other than the pickup's own,
//!    that the region policy accepts are candidates; an empty set falls back to
//!    a uniform draw over the whole table.
//!
//! Either fallback still yields a valid pair, so the engine always commits
//! within `2 * ceil(N / quota)` calls.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::RideConfig;
use crate::geo::{units_to_miles, GeoPoint, SpawnPoint};
use crate::host::SpatialOracle;
use crate::locations::LocationTable;
use crate::settings::RegionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPhase {
    NotStarted,
    ScanningPickup,
    PickupReady,
    ScanningDropoff,
    /// Pair chosen; waiting for [LocationAssignmentEngine::commit].
    DropoffReady,
    Committed,
}

/// Committed pickup/drop-off pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub pickup_idx: usize,
    pub dropoff_idx: usize,
    /// Where the rider spawns and which way they face.
    pub spawn: SpawnPoint,
    pub pickup_marker: GeoPoint,
    pub dropoff_marker: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanLimits {
    pub quota: usize,
    pub min_pickup_miles: f32,
    pub max_pickup_miles: f32,
    pub min_dropoff_miles: f32,
}

impl From<&RideConfig> for ScanLimits {
    fn from(config: &RideConfig) -> Self {
        Self {
            quota: config.scan_quota,
            min_pickup_miles: config.min_pickup_miles,
            max_pickup_miles: config.max_pickup_miles,
            min_dropoff_miles: config.min_dropoff_miles,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationAssignmentEngine {
    table: Arc<LocationTable>,
    limits: ScanLimits,
    phase: AssignmentPhase,
    scan_cursor: usize,
    pickup_candidates: Vec<usize>,
    dropoff_candidates: Vec<usize>,
    closest_pickup: Option<(usize, f32)>,
    pickup_idx: Option<usize>,
    dropoff_idx: Option<usize>,
}

impl LocationAssignmentEngine {
    pub fn new(table: Arc<LocationTable>, limits: ScanLimits) -> Self {
        Self {
            table,
            limits,
            phase: AssignmentPhase::NotStarted,
            scan_cursor: 0,
            pickup_candidates: Vec::new(),
            dropoff_candidates: Vec::new(),
            closest_pickup: None,
            pickup_idx: None,
            dropoff_idx: None,
        }
    }

    pub fn table(&self) -> &LocationTable {
        &self.table
    }

    pub fn phase(&self) -> AssignmentPhase {
        self.phase
    }

    pub fn scan_cursor(&self) -> usize {
        self.scan_cursor
    }

    pub fn pickup_candidates(&self) -> &[usize] {
        &self.pickup_candidates
    }

    pub fn dropoff_candidates(&self) -> &[usize] {
        &self.dropoff_candidates
    }

    /// Closest spawn point seen so far, with its distance in miles.
    pub fn closest_pickup(&self) -> Option<(usize, f32)> {
        self.closest_pickup
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            self.phase,
            AssignmentPhase::DropoffReady | AssignmentPhase::Committed
        )
    }

    /// Continue the search by at most one quota per scan phase. No-op once ready.
    pub fn advance<O, R>(
        &mut self,
        observer: GeoPoint,
        oracle: &O,
        rng: &mut R,
        policy: RegionPolicy,
    ) where
        O: SpatialOracle + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase == AssignmentPhase::NotStarted {
            self.phase = AssignmentPhase::ScanningPickup;
        }

        if self.phase == AssignmentPhase::ScanningPickup {
            self.scan_pickups(observer, oracle);
            if self.scan_cursor == self.table.len() {
                self.choose_pickup(rng);
            }
        }

        if self.phase == AssignmentPhase::PickupReady {
            self.scan_cursor = 0;
            self.phase = AssignmentPhase::ScanningDropoff;
        }

        if self.phase == AssignmentPhase::ScanningDropoff {
            self.scan_dropoffs(oracle, policy);
            if self.scan_cursor == self.table.len() {
                self.scan_cursor = 0;
                self.choose_dropoff(rng);
            }
        }
    }

    /// Lock in the chosen pair. Returns `None` until the search is ready.
    pub fn commit(&mut self) -> Option<Assignment> {
        if !self.is_ready() {
            return None;
        }
        let pickup_idx = self.pickup_idx?;
        let dropoff_idx = self.dropoff_idx?;
        self.phase = AssignmentPhase::Committed;
        Some(Assignment {
            pickup_idx,
            dropoff_idx,
            spawn: self.table.spawn(pickup_idx),
            pickup_marker: self.table.marker(pickup_idx),
            dropoff_marker: self.table.marker(dropoff_idx),
        })
    }

    pub fn reset(&mut self) {
        self.phase = AssignmentPhase::NotStarted;
        self.scan_cursor = 0;
        self.pickup_candidates.clear();
        self.dropoff_candidates.clear();
        self.closest_pickup = None;
        self.pickup_idx = None;
        self.dropoff_idx = None;
    }

    fn quota_end(&self) -> usize {
        (self.scan_cursor + self.limits.quota.max(1)).min(self.table.len())
    }

    fn scan_pickups<O: SpatialOracle + ?Sized>(&mut self, observer: GeoPoint, oracle: &O) {
        let end = self.quota_end();
        for idx in self.scan_cursor..end {
            let spawn = self.table.spawn(idx).position;
            let miles = finite_or_max(units_to_miles(oracle.travel_distance(observer, spawn)));

            if self.closest_pickup.map_or(true, |(_, best)| miles < best) {
                self.closest_pickup = Some((idx, miles));
            }
            if miles >= self.limits.min_pickup_miles && miles <= self.limits.max_pickup_miles {
                self.pickup_candidates.push(idx);
            }
        }
        self.scan_cursor = end;
    }

    fn choose_pickup<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let chosen = match self.pickup_candidates.choose(rng) {
            Some(idx) => *idx,
            None => {
                // the table is never empty, so the first scanned entry set this
                let (idx, miles) = self.closest_pickup.unwrap_or((0, f32::MAX));
                debug!(idx, miles, "no pickup in band, using closest location");
                idx
            }
        };
        debug!(
            pickup_idx = chosen,
            candidates = self.pickup_candidates.len(),
            "pickup chosen"
        );
        self.pickup_idx = Some(chosen);
        self.phase = AssignmentPhase::PickupReady;
    }

    fn scan_dropoffs<O: SpatialOracle + ?Sized>(&mut self, oracle: &O, policy: RegionPolicy) {
        let Some(pickup_idx) = self.pickup_idx else {
            return;
        };
        let origin = self.table.spawn(pickup_idx).position;
        let pickup_region = self.table.region_of(pickup_idx);
        let end = self.quota_end();
        for idx in self.scan_cursor..end {
            if idx == pickup_idx {
                continue;
            }
            let marker = self.table.marker(idx);
            let miles = finite_or_max(units_to_miles(oracle.travel_distance(origin, marker)));
            if miles >= self.limits.min_dropoff_miles
                && policy.accepts(pickup_region, self.table.region_of(idx))
            {
                self.dropoff_candidates.push(idx);
            }
        }
        self.scan_cursor = end;
    }

    fn choose_dropoff<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(pickup_idx) = self.pickup_idx else {
            return;
        };
        let len = self.table.len();
        let mut chosen = match self.dropoff_candidates.choose(rng) {
            Some(idx) => *idx,
            None => {
                debug!("no drop-off candidates, drawing from the whole table");
                rng.gen_range(0..len)
            }
        };
        while chosen == pickup_idx {
            chosen = rng.gen_range(0..len);
        }
        debug!(
            dropoff_idx = chosen,
            candidates = self.dropoff_candidates.len(),
            "drop-off chosen"
        );
        self.dropoff_idx = Some(chosen);
        self.phase = AssignmentPhase::DropoffReady;
    }
}

/// Oracle failures (NaN) sort after every real distance.
fn finite_or_max(miles: f32) -> f32 {
    if miles.is_nan() {
        f32::MAX
    } else {
        miles
    }
}
