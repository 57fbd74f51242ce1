//! World-space points and unit conversion.
//!
//! Host distances are opaque "units"; everything the ride logic reasons about
//! (candidate bands, fares) is expressed in miles via [UNITS_PER_MILE].

use serde::{Deserialize, Serialize};

/// Host distance units in one mile.
pub const UNITS_PER_MILE: f32 = 1609.34;

/// Convert a host distance to miles.
pub fn units_to_miles(units: f32) -> f32 {
    units / UNITS_PER_MILE
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl GeoPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in host units.
    pub fn distance_to(&self, other: &GeoPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }
}

/// Rider spawn point: position plus the heading the rider faces on spawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: GeoPoint,
    pub heading: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = GeoPoint::new(0.0, 0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0, 12.0);
        assert!((a.distance_to(&b) - 13.0).abs() < 1e-5);
        assert!((b.distance_to(&a) - 13.0).abs() < 1e-5);
    }

    #[test]
    fn ten_miles_of_units_converts_back() {
        let miles = units_to_miles(10.0 * UNITS_PER_MILE);
        assert!((miles - 10.0).abs() < 1e-4);
    }
}
