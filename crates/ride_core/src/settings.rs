//! Driver-facing settings and cumulative statistics.

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locations::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatingMode {
    /// Each ride is rated from its incidents.
    #[default]
    Enabled,
    /// Every ride reuses the current average rating.
    Disabled,
}

/// Which region a drop-off may be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionPolicy {
    Everywhere,
    #[default]
    City,
    /// Drop-off always lies in the other region from the pickup.
    CityToCountryside,
    Countryside,
}

impl RegionPolicy {
    /// Whether a drop-off in `dropoff` is eligible for a pickup in `pickup`.
    pub fn accepts(self, pickup: Region, dropoff: Region) -> bool {
        match self {
            RegionPolicy::Everywhere => true,
            RegionPolicy::City => dropoff == Region::City,
            RegionPolicy::Countryside => dropoff == Region::Countryside,
            RegionPolicy::CityToCountryside => dropoff == pickup.opposite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown setting value '{0}'")]
pub struct UnknownSetting(pub String);

impl fmt::Display for RatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingMode::Enabled => write!(f, "Enabled"),
            RatingMode::Disabled => write!(f, "Disabled"),
        }
    }
}

impl FromStr for RatingMode {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Enabled" => Ok(RatingMode::Enabled),
            "Disabled" => Ok(RatingMode::Disabled),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

impl fmt::Display for RegionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionPolicy::Everywhere => write!(f, "Everywhere"),
            RegionPolicy::City => write!(f, "City"),
            RegionPolicy::CityToCountryside => write!(f, "City <-> Countryside"),
            RegionPolicy::Countryside => write!(f, "Countryside"),
        }
    }
}

impl FromStr for RegionPolicy {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Everywhere" => Ok(RegionPolicy::Everywhere),
            "City" => Ok(RegionPolicy::City),
            "City <-> Countryside" | "City<->Countryside" => Ok(RegionPolicy::CityToCountryside),
            "Countryside" => Ok(RegionPolicy::Countryside),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct DriverSettings {
    pub rating_mode: RatingMode,
    pub region_policy: RegionPolicy,
    pub pay_rate_per_mile: u32,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            rating_mode: RatingMode::Enabled,
            region_policy: RegionPolicy::City,
            pay_rate_per_mile: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Resource, Serialize, Deserialize)]
pub struct DriverStats {
    pub average_rating: f32,
    pub total_jobs: u32,
    pub total_earnings: i64,
}

impl DriverStats {
    /// Fold one finished ride into the running totals.
    pub fn record_ride(&mut self, earnings: i64, rating: f32) {
        self.average_rating = crate::pricing::updated_average(
            self.average_rating,
            self.total_jobs,
            rating,
        );
        self.total_jobs += 1;
        self.total_earnings += earnings;
    }
}
