//! Collaborator contracts for the real-time host.
//!
//! The host spawns agents, measures distances, draws markers and owns the map
//! indicators. Ride logic only ever talks to it through these traits; the
//! concrete host is stored in the world as [HostResource].

use bevy_ecs::prelude::Resource;

use crate::geo::GeoPoint;
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VehicleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorHandle(pub u64);

/// Per-tick view of one vehicle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleView {
    pub id: VehicleId,
    pub position: GeoPoint,
    pub speed: f32,
    /// Car-class vehicle (riders only board cars).
    pub is_car: bool,
    /// The vehicle collided with something during this tick.
    pub collided: bool,
    pub occupants: Vec<AgentId>,
}

impl VehicleView {
    pub fn carries(&self, agent: AgentId) -> bool {
        self.occupants.contains(&agent)
    }
}

/// Per-tick view of the player-controlled driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverView {
    pub position: GeoPoint,
    /// Vehicle the driver currently sits in, if any.
    pub vehicle: Option<VehicleView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Driver,
    Passenger,
}

/// High-level instructions for the rider agent. The host owns the behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiderIntent {
    /// Walk to and enter `vehicle`; the host warps the rider in after `timeout_secs`.
    EnterVehicle {
        vehicle: VehicleId,
        timeout_secs: f32,
        seat: Seat,
    },
    LeaveVehicle,
    Wander,
    SetInvincible(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Rider,
    Destination,
    Car,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub position: GeoPoint,
    pub show_route: bool,
}

pub trait SpatialOracle {
    /// Road-network distance in host units.
    fn travel_distance(&self, from: GeoPoint, to: GeoPoint) -> f32;
    /// As-the-crow-flies distance in host units.
    fn straight_line_distance(&self, from: GeoPoint, to: GeoPoint) -> f32;
    fn ground_height(&self, x: f32, y: f32) -> Option<f32>;
}

pub trait AgentHost {
    /// Simulated seconds since the previous tick.
    fn frame_delta_secs(&self) -> f32;
    fn driver(&self) -> DriverView;
    /// Whether the host wants the driver taken off duty (wanted level, character switch).
    fn abort_requested(&mut self) -> bool;

    fn spawn_rider(&mut self, at: GeoPoint, heading: f32) -> Option<AgentId>;
    fn delete_agent(&mut self, agent: AgentId);
    fn agent_alive(&self, agent: AgentId) -> bool;
    fn issue_intent(&mut self, agent: AgentId, intent: RiderIntent);

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<GeoPoint>;
    fn nearby_vehicles(&self, at: GeoPoint, radius: f32) -> Vec<VehicleView>;
    fn delete_vehicle(&mut self, vehicle: VehicleId);
    fn set_vehicle_speed(&mut self, vehicle: VehicleId, speed: f32);
    /// Disable accelerate/brake/exit controls for the current frame only.
    fn restrict_vehicle_controls(&mut self);

    /// Draw a transient 3D marker; must be repeated every tick to stay visible.
    fn draw_marker(&mut self, at: GeoPoint);
    fn pay_driver(&mut self, amount: i64);
}

pub trait MapIndicators {
    fn create_indicator(&mut self, spec: IndicatorSpec) -> IndicatorHandle;
    fn delete_indicator(&mut self, handle: IndicatorHandle);
    /// Toggle the route flag off and on again.
    fn toggle_route(&mut self, handle: IndicatorHandle);
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Everything the ride loop needs from its host.
pub trait RideHost:
    SpatialOracle + AgentHost + MapIndicators + Notifier + Send + Sync + 'static
{
}

impl<T> RideHost for T where
    T: SpatialOracle + AgentHost + MapIndicators + Notifier + Send + Sync + 'static
{
}

/// ECS resource wrapping the concrete host.
#[derive(Resource)]
pub struct HostResource<H: RideHost>(pub H);

impl<H: RideHost> std::ops::Deref for HostResource<H> {
    type Target = H;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<H: RideHost> std::ops::DerefMut for HostResource<H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
