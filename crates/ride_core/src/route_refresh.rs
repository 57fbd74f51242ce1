//! Periodic route re-toggle for the active navigation indicator.
//!
//! Some hosts stop drawing a route after it has been shown for a while;
//! flipping the route flag brings it back. Only the one indicator the driver is
//! navigating to is refreshed.

use crate::debounce::ElapsedDebounce;
use crate::host::IndicatorHandle;

/// Indicator handles currently owned by the ride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RideIndicators {
    pub rider: Option<IndicatorHandle>,
    pub destination: Option<IndicatorHandle>,
    pub car: Option<IndicatorHandle>,
}

impl RideIndicators {
    /// The single indicator to refresh, or `None` when no pattern matches.
    pub fn navigation_target(&self) -> Option<IndicatorHandle> {
        match (self.rider, self.destination, self.car) {
            (None, Some(destination), None) => Some(destination),
            (Some(rider), None, None) => Some(rider),
            (None, Some(_), Some(car)) => Some(car),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rider.is_none() && self.destination.is_none() && self.car.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RouteRefreshThrottle {
    debounce: ElapsedDebounce,
}

impl RouteRefreshThrottle {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            debounce: ElapsedDebounce::new(interval_secs),
        }
    }

    /// First call arms the timer; once the interval has elapsed, returns the
    /// indicator to toggle and starts over.
    pub fn tick(
        &mut self,
        delta_secs: f32,
        indicators: &RideIndicators,
    ) -> Option<IndicatorHandle> {
        if !self.debounce.is_active() {
            self.debounce.arm();
            return None;
        }
        if self.debounce.advance(delta_secs) {
            indicators.navigation_target()
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.debounce.reset();
    }
}
