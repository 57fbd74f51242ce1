//! Test helpers: a recording fake host, location table builders and a ready
//! world.
//!
//! Compiled with the default `test-helpers` feature so integration tests and
//! benches can share them.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::Arc;

use bevy_ecs::prelude::World;

use crate::geo::{GeoPoint, SpawnPoint, UNITS_PER_MILE};
use crate::host::{
    AgentHost, AgentId, DriverView, IndicatorHandle, IndicatorKind, IndicatorSpec,
    MapIndicators, Notifier, RiderIntent, SpatialOracle, VehicleId, VehicleView,
};
use crate::locations::LocationTable;
use crate::notice::Notice;
use crate::session::{build_ride_world, SessionParams};
use crate::settings::{DriverSettings, DriverStats};
use crate::store::{MemoryStore, SettingsStore, StoreError};

/// Id of the vehicle [FakeHost::with_driver_in_car] puts the driver in.
pub const DRIVER_VEHICLE: VehicleId = VehicleId(1);

/// One collaborator call, in the order the ride issued them.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SpawnRider {
        agent: AgentId,
        at: GeoPoint,
        heading: f32,
    },
    DeleteAgent(AgentId),
    Intent(AgentId, RiderIntent),
    DeleteVehicle(VehicleId),
    SetVehicleSpeed(VehicleId, f32),
    RestrictControls,
    DrawMarker(GeoPoint),
    Pay(i64),
    CreateIndicator(IndicatorHandle, IndicatorSpec),
    DeleteIndicator(IndicatorHandle),
    ToggleRoute(IndicatorHandle),
    Notify(Notice),
}

/// Scriptable host that records every call.
///
/// Distances are Euclidean; travel distance is the straight-line distance
/// times `travel_factor`. With `seat_on_enter` the rider is seated the moment
/// an enter-vehicle intent arrives, and removed again on leave.
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub delta_secs: f32,
    pub driver: DriverView,
    /// One-shot off-duty request, cleared when read.
    pub interrupt: bool,
    /// Number of upcoming spawn attempts that fail.
    pub failing_spawns: u32,
    pub seat_on_enter: bool,
    pub travel_factor: f32,
    pub ground_z: Option<f32>,
    /// Vehicles in the world other than the one the driver sits in.
    pub vehicles: Vec<VehicleView>,
    pub calls: Vec<HostCall>,
    spawned: HashSet<AgentId>,
    dead: HashSet<AgentId>,
    indicators: BTreeMap<IndicatorHandle, IndicatorSpec>,
    next_id: u64,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            delta_secs: 0.1,
            driver: DriverView::default(),
            interrupt: false,
            failing_spawns: 0,
            seat_on_enter: true,
            travel_factor: 1.0,
            ground_z: None,
            vehicles: Vec::new(),
            calls: Vec::new(),
            spawned: HashSet::new(),
            dead: HashSet::new(),
            indicators: BTreeMap::new(),
            next_id: 100,
        }
    }

    /// Driver sitting still in a car at `at`.
    pub fn with_driver_in_car(mut self, at: GeoPoint) -> Self {
        self.driver = DriverView {
            position: at,
            vehicle: Some(VehicleView {
                id: DRIVER_VEHICLE,
                position: at,
                speed: 0.0,
                is_car: true,
                collided: false,
                occupants: Vec::new(),
            }),
        };
        self
    }

    /// Teleport the driver (and their vehicle) to `at`.
    pub fn move_driver(&mut self, at: GeoPoint) {
        self.driver.position = at;
        if let Some(vehicle) = self.driver.vehicle.as_mut() {
            vehicle.position = at;
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        if let Some(vehicle) = self.driver.vehicle.as_mut() {
            vehicle.speed = speed;
        }
    }

    pub fn set_collided(&mut self, collided: bool) {
        if let Some(vehicle) = self.driver.vehicle.as_mut() {
            vehicle.collided = collided;
        }
    }

    /// Driver steps out; the vehicle stays parked where it is.
    pub fn exit_vehicle(&mut self) {
        if let Some(vehicle) = self.driver.vehicle.take() {
            self.vehicles.push(vehicle);
        }
    }

    /// Driver gets back into a parked vehicle.
    pub fn enter_vehicle(&mut self, id: VehicleId) {
        if let Some(idx) = self.vehicles.iter().position(|vehicle| vehicle.id == id) {
            let vehicle = self.vehicles.remove(idx);
            self.driver.position = vehicle.position;
            self.driver.vehicle = Some(vehicle);
        }
    }

    pub fn park_vehicle(&mut self, vehicle: VehicleView) {
        self.vehicles.push(vehicle);
    }

    pub fn kill_agent(&mut self, agent: AgentId) {
        self.dead.insert(agent);
    }

    pub fn live_indicators(&self) -> Vec<IndicatorSpec> {
        self.indicators.values().copied().collect()
    }

    pub fn live_indicator(&self, kind: IndicatorKind) -> Option<IndicatorHandle> {
        self.indicators
            .iter()
            .find(|(_, spec)| spec.kind == kind)
            .map(|(handle, _)| *handle)
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Notify(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn paid_total(&self) -> i64 {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Pay(amount) => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut VehicleView> {
        self.driver
            .vehicle
            .iter_mut()
            .chain(self.vehicles.iter_mut())
            .find(|vehicle| vehicle.id == id)
    }

    fn all_vehicles(&self) -> impl Iterator<Item = &VehicleView> {
        self.driver.vehicle.iter().chain(self.vehicles.iter())
    }
}

impl SpatialOracle for FakeHost {
    fn travel_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        from.distance_to(&to) * self.travel_factor
    }

    fn straight_line_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        from.distance_to(&to)
    }

    fn ground_height(&self, _x: f32, _y: f32) -> Option<f32> {
        self.ground_z
    }
}

impl AgentHost for FakeHost {
    fn frame_delta_secs(&self) -> f32 {
        self.delta_secs
    }

    fn driver(&self) -> DriverView {
        self.driver.clone()
    }

    fn abort_requested(&mut self) -> bool {
        std::mem::take(&mut self.interrupt)
    }

    fn spawn_rider(&mut self, at: GeoPoint, heading: f32) -> Option<AgentId> {
        if self.failing_spawns > 0 {
            self.failing_spawns -= 1;
            return None;
        }
        let agent = AgentId(self.next_id());
        self.spawned.insert(agent);
        self.calls.push(HostCall::SpawnRider { agent, at, heading });
        Some(agent)
    }

    fn delete_agent(&mut self, agent: AgentId) {
        self.calls.push(HostCall::DeleteAgent(agent));
        self.dead.insert(agent);
        for vehicle in self.driver.vehicle.iter_mut().chain(self.vehicles.iter_mut()) {
            vehicle.occupants.retain(|occupant| *occupant != agent);
        }
    }

    fn agent_alive(&self, agent: AgentId) -> bool {
        self.spawned.contains(&agent) && !self.dead.contains(&agent)
    }

    fn issue_intent(&mut self, agent: AgentId, intent: RiderIntent) {
        self.calls.push(HostCall::Intent(agent, intent));
        match intent {
            RiderIntent::EnterVehicle { vehicle, .. } if self.seat_on_enter => {
                if let Some(vehicle) = self.vehicle_mut(vehicle) {
                    vehicle.occupants.push(agent);
                }
            }
            RiderIntent::LeaveVehicle => {
                for vehicle in self.driver.vehicle.iter_mut().chain(self.vehicles.iter_mut()) {
                    vehicle.occupants.retain(|occupant| *occupant != agent);
                }
            }
            _ => {}
        }
    }

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<GeoPoint> {
        self.all_vehicles()
            .find(|candidate| candidate.id == vehicle)
            .map(|candidate| candidate.position)
    }

    fn nearby_vehicles(&self, at: GeoPoint, radius: f32) -> Vec<VehicleView> {
        self.all_vehicles()
            .filter(|vehicle| vehicle.position.distance_to(&at) < radius)
            .cloned()
            .collect()
    }

    fn delete_vehicle(&mut self, vehicle: VehicleId) {
        self.calls.push(HostCall::DeleteVehicle(vehicle));
        self.vehicles.retain(|candidate| candidate.id != vehicle);
    }

    fn set_vehicle_speed(&mut self, vehicle: VehicleId, speed: f32) {
        self.calls.push(HostCall::SetVehicleSpeed(vehicle, speed));
        if let Some(vehicle) = self.vehicle_mut(vehicle) {
            vehicle.speed = speed;
        }
    }

    fn restrict_vehicle_controls(&mut self) {
        self.calls.push(HostCall::RestrictControls);
    }

    fn draw_marker(&mut self, at: GeoPoint) {
        self.calls.push(HostCall::DrawMarker(at));
    }

    fn pay_driver(&mut self, amount: i64) {
        self.calls.push(HostCall::Pay(amount));
    }
}

impl MapIndicators for FakeHost {
    fn create_indicator(&mut self, spec: IndicatorSpec) -> IndicatorHandle {
        let handle = IndicatorHandle(self.next_id());
        self.indicators.insert(handle, spec);
        self.calls.push(HostCall::CreateIndicator(handle, spec));
        handle
    }

    fn delete_indicator(&mut self, handle: IndicatorHandle) {
        self.indicators.remove(&handle);
        self.calls.push(HostCall::DeleteIndicator(handle));
    }

    fn toggle_route(&mut self, handle: IndicatorHandle) {
        self.calls.push(HostCall::ToggleRoute(handle));
    }
}

impl Notifier for FakeHost {
    fn notify(&mut self, notice: Notice) {
        self.calls.push(HostCall::Notify(notice));
    }
}

/// Oracle whose travel and straight-line distances are both Euclidean.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineOracle;

impl SpatialOracle for StraightLineOracle {
    fn travel_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        from.distance_to(&to)
    }

    fn straight_line_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        from.distance_to(&to)
    }

    fn ground_height(&self, _x: f32, _y: f32) -> Option<f32> {
        None
    }
}

/// `len` locations along the x axis, `spacing_miles` apart, starting at the
/// origin. Each marker sits on its spawn point.
pub fn line_table(len: usize, city_boundary: usize, spacing_miles: f32) -> LocationTable {
    let points: Vec<GeoPoint> = (0..len)
        .map(|idx| GeoPoint::new(idx as f32 * spacing_miles * UNITS_PER_MILE, 0.0, 0.0))
        .collect();
    build_table(points, city_boundary)
}

/// `side * side` locations on a square grid centred on the origin.
pub fn grid_table(side: usize, city_boundary: usize, spacing_miles: f32) -> LocationTable {
    let half = (side as f32 - 1.0) / 2.0;
    let points: Vec<GeoPoint> = (0..side * side)
        .map(|idx| {
            let col = (idx % side) as f32 - half;
            let row = (idx / side) as f32 - half;
            GeoPoint::new(
                col * spacing_miles * UNITS_PER_MILE,
                row * spacing_miles * UNITS_PER_MILE,
                0.0,
            )
        })
        .collect();
    build_table(points, city_boundary)
}

fn build_table(points: Vec<GeoPoint>, city_boundary: usize) -> LocationTable {
    let spawns = points
        .iter()
        .enumerate()
        .map(|(idx, position)| SpawnPoint {
            position: *position,
            heading: (idx * 90 % 360) as f32,
        })
        .collect();
    LocationTable::new(spawns, points, city_boundary).expect("valid test table")
}

/// Store whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
}

impl SettingsStore for FailingStore {
    fn load_settings(&self) -> Result<DriverSettings, StoreError> {
        Err(unavailable())
    }

    fn save_settings(&mut self, _settings: &DriverSettings) -> Result<(), StoreError> {
        Err(unavailable())
    }

    fn load_stats(&self) -> Result<DriverStats, StoreError> {
        Err(unavailable())
    }

    fn save_stats(&mut self, _stats: &DriverStats) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

/// World over a 40-entry line table (0.05 miles apart, first 20 city) with a
/// memory store and seed 7.
pub fn test_world(host: FakeHost) -> World {
    build_ride_world(
        host,
        Arc::new(line_table(40, 20, 0.05)),
        Box::new(MemoryStore::default()),
        SessionParams::default().with_seed(7),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_table_spacing_is_in_miles() {
        let table = line_table(3, 1, 0.5);
        let miles = table.spawn(0).position.distance_to(&table.spawn(2).position) / UNITS_PER_MILE;
        assert!((miles - 1.0).abs() < 1e-4);
        assert_eq!(table.marker(1), table.spawn(1).position);
    }

    #[test]
    fn fake_host_seats_and_releases_rider() {
        let mut host = FakeHost::new().with_driver_in_car(GeoPoint::default());
        let agent = host.spawn_rider(GeoPoint::default(), 0.0).expect("agent");
        host.issue_intent(
            agent,
            RiderIntent::EnterVehicle {
                vehicle: DRIVER_VEHICLE,
                timeout_secs: 10.0,
                seat: crate::host::Seat::Passenger,
            },
        );
        assert!(host.driver().vehicle.expect("vehicle").carries(agent));
        host.issue_intent(agent, RiderIntent::LeaveVehicle);
        assert!(!host.driver().vehicle.expect("vehicle").carries(agent));
    }

    #[test]
    fn interrupt_is_one_shot() {
        let mut host = FakeHost::new();
        host.interrupt = true;
        assert!(host.abort_requested());
        assert!(!host.abort_requested());
    }
}
