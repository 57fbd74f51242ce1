//! Fare, rating and tip calculation for a finished ride.
//!
//! The trip distance is a policy decision, not a measurement: the host's
//! travel-distance oracle occasionally reports a route many times longer than
//! the trip. When travel distance exceeds straight-line distance by more than
//! [DistancePolicy::fallback_threshold_miles], the straight-line distance is
//! paid instead.

use serde::Serialize;

use crate::geo::{units_to_miles, GeoPoint};
use crate::host::SpatialOracle;
use crate::incidents::IncidentCounters;
use crate::settings::{DriverSettings, RatingMode};

// Penalties in tenths of a star, so tier boundaries are hit exactly.
const MAX_RATING_TENTHS: u64 = 50;
const MIN_RATING_TENTHS: u64 = 10;
const SMALL_INCIDENT_PENALTY_TENTHS: u64 = 1;
const MEDIUM_INCIDENT_PENALTY_TENTHS: u64 = 2;
const BIG_INCIDENT_PENALTY_TENTHS: u64 = 5;

/// Tip share by minimum rating, highest tier first.
const TIP_TIERS: [(f32, f64); 4] = [(4.5, 0.4), (3.5, 0.3), (2.5, 0.2), (1.5, 0.1)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistancePolicy {
    pub fallback_threshold_miles: f32,
}

impl Default for DistancePolicy {
    fn default() -> Self {
        Self {
            fallback_threshold_miles: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DistanceSource {
    Travel,
    StraightLine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripDistance {
    pub miles: f32,
    pub source: DistanceSource,
}

/// One settled ride. Folded into [crate::settings::DriverStats] and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RideRecord {
    pub distance_miles: f32,
    pub distance_source: DistanceSource,
    pub payment: i64,
    pub rating: f32,
    pub tip: i64,
}

impl RideRecord {
    pub fn total_paid(&self) -> i64 {
        self.payment + self.tip
    }
}

pub fn compute_distance<O: SpatialOracle + ?Sized>(
    oracle: &O,
    pickup: GeoPoint,
    dropoff: GeoPoint,
    policy: &DistancePolicy,
) -> TripDistance {
    let travel = units_to_miles(oracle.travel_distance(pickup, dropoff));
    let straight = units_to_miles(oracle.straight_line_distance(pickup, dropoff));
    if travel - straight <= policy.fallback_threshold_miles {
        TripDistance {
            miles: travel,
            source: DistanceSource::Travel,
        }
    } else {
        TripDistance {
            miles: straight,
            source: DistanceSource::StraightLine,
        }
    }
}

pub fn compute_payment(distance_miles: f32, rate_per_mile: u32) -> i64 {
    (f64::from(distance_miles) * f64::from(rate_per_mile)).round() as i64
}

/// Rate the ride from its incidents. Always zeroes `incidents`, even when the
/// rating mode ignores them.
pub fn compute_rating(
    incidents: &mut IncidentCounters,
    mode: RatingMode,
    prior_average: f32,
) -> f32 {
    let counters = std::mem::take(incidents);
    match mode {
        RatingMode::Disabled => prior_average,
        RatingMode::Enabled => {
            let penalty = u64::from(counters.small) * SMALL_INCIDENT_PENALTY_TENTHS
                + u64::from(counters.medium) * MEDIUM_INCIDENT_PENALTY_TENTHS
                + u64::from(counters.big) * BIG_INCIDENT_PENALTY_TENTHS;
            let tenths = MAX_RATING_TENTHS
                .saturating_sub(penalty)
                .max(MIN_RATING_TENTHS);
            tenths as f32 / 10.0
        }
    }
}

/// Tip as a share of `payment`, tiered by rating, rounded half away from zero.
pub fn compute_tip(rating: f32, payment: i64) -> i64 {
    let share = TIP_TIERS
        .iter()
        .find(|(min_rating, _)| rating >= *min_rating)
        .map(|(_, share)| *share)
        .unwrap_or(0.0);
    (share * payment as f64).round() as i64
}

/// Running average after one more rating.
pub fn updated_average(old_average: f32, old_count: u32, rating: f32) -> f32 {
    (old_average * old_count as f32 + rating) / (old_count as f32 + 1.0)
}

/// Settles a ride: distance policy, payment, rating and tip in one place.
#[derive(Debug, Clone, Copy, Default)]
pub struct FareCalculator {
    pub policy: DistancePolicy,
}

impl FareCalculator {
    pub fn new(policy: DistancePolicy) -> Self {
        Self { policy }
    }

    pub fn quote<O: SpatialOracle + ?Sized>(
        &self,
        oracle: &O,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        rate_per_mile: u32,
    ) -> (TripDistance, i64) {
        let distance = compute_distance(oracle, pickup, dropoff, &self.policy);
        (distance, compute_payment(distance.miles, rate_per_mile))
    }

    pub fn settle<O: SpatialOracle + ?Sized>(
        &self,
        oracle: &O,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        incidents: &mut IncidentCounters,
        settings: &DriverSettings,
        prior_average: f32,
    ) -> RideRecord {
        let rating = compute_rating(incidents, settings.rating_mode, prior_average);
        let (distance, payment) =
            self.quote(oracle, pickup, dropoff, settings.pay_rate_per_mile);
        let tip = compute_tip(rating, payment);
        RideRecord {
            distance_miles: distance.miles,
            distance_source: distance.source,
            payment,
            rating,
            tip,
        }
    }
}
