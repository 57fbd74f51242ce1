//! Ride lifecycle state owned by the world.
//!
//! [RideLifecycle] is the single owner of the rider, the indicator handles and
//! the assignment/incident/timer sub-components. Systems mutate it in tick order;
//! [RideLifecycle::teardown] is the one emergency path back to `Idle`.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use tracing::{debug, warn};

use crate::assignment::{Assignment, LocationAssignmentEngine, ScanLimits};
use crate::config::RideConfig;
use crate::debounce::ElapsedDebounce;
use crate::host::{AgentHost, AgentId, MapIndicators, VehicleId};
use crate::incidents::IncidentTracker;
use crate::locations::LocationTable;
use crate::route_refresh::{RideIndicators, RouteRefreshThrottle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideState {
    #[default]
    Idle,
    Searching,
    AwaitingSpawn,
    RiderWaitingAtPickup,
    RiderBoarding,
    /// Passed through on the boarding tick; observably the same as en route.
    OnboardAwaitingDestination,
    EnRouteToDropoff,
    /// Drop-off cooldown running.
    DroppedOff,
}

/// The live rider. On drop-off it leaves this slot for
/// [RideLifecycle::pending_removal].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rider {
    pub agent: AgentId,
    pub onboard: bool,
    pub boarding_issued: bool,
    /// Vehicle latched when the rider boarded.
    pub assigned_vehicle: Option<VehicleId>,
}

impl Rider {
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            onboard: false,
            boarding_issued: false,
            assigned_vehicle: None,
        }
    }
}

/// Whether the driver is on duty. Off duty, every tick only tears down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Resource)]
pub enum DutyStatus {
    #[default]
    Available,
    Unavailable,
}

/// Spatial and vehicle predicates, evaluated once at the start of each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Resource)]
pub struct TickPredicates {
    /// Driver sits in a car-class vehicle.
    pub in_car: bool,
    pub vehicle_speed: f32,
    pub stationary: bool,
    pub collided: bool,
    pub at_pickup: bool,
    pub at_dropoff: bool,
    pub pickup_visible: bool,
    pub dropoff_visible: bool,
    /// The rider is an occupant of the driver's vehicle.
    pub rider_in_vehicle: bool,
    /// The driver sits in the vehicle latched for this trip.
    pub in_trip_vehicle: bool,
}

#[derive(Resource)]
pub struct RideLifecycle {
    pub state: RideState,
    pub rider: Option<Rider>,
    /// Previous rider, wandering off; deleted before the next spawn.
    pub pending_removal: Option<AgentId>,
    pub indicators: RideIndicators,
    pub trip: Option<Assignment>,
    pub engine: LocationAssignmentEngine,
    pub incidents: IncidentTracker,
    pub route_refresh: RouteRefreshThrottle,
    pub dropoff_cooldown: ElapsedDebounce,
}

impl RideLifecycle {
    pub fn new(table: Arc<LocationTable>, config: &RideConfig) -> Self {
        Self {
            state: RideState::Idle,
            rider: None,
            pending_removal: None,
            indicators: RideIndicators::default(),
            trip: None,
            engine: LocationAssignmentEngine::new(table, ScanLimits::from(config)),
            incidents: IncidentTracker::new(config.incident_cooldown_secs, config.severity_bands()),
            route_refresh: RouteRefreshThrottle::new(config.route_refresh_secs),
            dropoff_cooldown: ElapsedDebounce::new(config.dropoff_reset_secs),
        }
    }

    pub fn rider_agent(&self) -> Option<AgentId> {
        self.rider.map(|rider| rider.agent)
    }

    pub fn rider_onboard(&self) -> bool {
        self.rider.is_some_and(|rider| rider.onboard)
    }

    pub fn trip_vehicle(&self) -> Option<VehicleId> {
        self.rider.and_then(|rider| rider.assigned_vehicle)
    }

    pub fn set_state(&mut self, next: RideState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "ride state");
            self.state = next;
        }
    }

    /// Clear per-ride state once the drop-off cooldown ends. Keeps the
    /// pending-removal rider.
    pub fn finish_cooldown(&mut self) {
        self.trip = None;
        self.engine.reset();
        self.incidents.reset();
        self.route_refresh.reset();
        self.dropoff_cooldown.reset();
        self.set_state(RideState::Idle);
    }

    /// Delete every indicator and agent the ride owns and return to `Idle`.
    /// Safe from any state and idempotent: handles are taken, so nothing is
    /// deleted twice. Returns `true` when a live ride was discarded.
    pub fn teardown<H>(&mut self, host: &mut H) -> bool
    where
        H: AgentHost + MapIndicators + ?Sized,
    {
        let discarded = self.rider.is_some();

        for handle in [
            self.indicators.rider.take(),
            self.indicators.destination.take(),
            self.indicators.car.take(),
        ]
        .into_iter()
        .flatten()
        {
            host.delete_indicator(handle);
        }
        if let Some(rider) = self.rider.take() {
            host.delete_agent(rider.agent);
        }
        if let Some(agent) = self.pending_removal.take() {
            host.delete_agent(agent);
        }

        self.trip = None;
        self.engine.reset();
        self.incidents.reset();
        self.route_refresh.reset();
        self.dropoff_cooldown.reset();
        if self.state != RideState::Idle {
            warn!(state = ?self.state, discarded, "ride torn down");
        }
        self.state = RideState::Idle;
        discarded
    }
}
