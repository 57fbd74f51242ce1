//! Scripted host: a synthetic driver that follows whichever route indicator is
//! live, over a Manhattan road grid.
//!
//! The driver cruises toward the destination indicator if there is one, else
//! the rider indicator, and stops on arrival. Riders told to enter the car walk
//! for a random delay and then sit down. While moving, the car collides at a
//! configurable rate.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ride_core::geo::{GeoPoint, SpawnPoint, UNITS_PER_MILE};
use ride_core::host::{
    AgentHost, AgentId, DriverView, IndicatorHandle, IndicatorKind, IndicatorSpec, MapIndicators,
    Notifier, RiderIntent, SpatialOracle, VehicleId, VehicleView,
};
use ride_core::locations::{LocationTable, LocationTableError};
use ride_core::notice::Notice;
use tracing::{debug, info};

const DRIVER_VEHICLE: VehicleId = VehicleId(1);
/// Markers sit this far east of their spawn point, inside the activation radius.
const MARKER_OFFSET: f32 = 1.5;
const MIN_CRUISE_SPEED: f32 = 8.0;
const MAX_CRUISE_SPEED: f32 = 35.0;
/// Seconds a rider takes to walk to the car.
const MIN_WALK_SECS: f32 = 1.0;
const MAX_WALK_SECS: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct HostSettings {
    pub frame_secs: f32,
    /// Expected collisions per second of driving.
    pub collision_rate: f64,
    /// Parked cars placed on random markers at start.
    pub parked_cars: usize,
    /// Chance per second that a rider still on the street is lost.
    pub rider_loss_rate: f64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            frame_secs: 1.0 / 30.0,
            collision_rate: 0.02,
            parked_cars: 10,
            rider_loss_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SimAgent {
    alive: bool,
    /// Seconds until the rider is seated, while walking to the car.
    boarding_in: Option<f32>,
}

pub struct ScriptedHost {
    settings: HostSettings,
    rng: StdRng,
    driver: VehicleView,
    cruise_speed: f32,
    parked: Vec<VehicleView>,
    agents: HashMap<AgentId, SimAgent>,
    indicators: BTreeMap<IndicatorHandle, IndicatorSpec>,
    next_id: u64,
    frames: u64,
    pub paid: i64,
}

impl ScriptedHost {
    pub fn new(settings: HostSettings, table: &LocationTable, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let parked = (0..settings.parked_cars)
            .map(|n| {
                let idx = rng.gen_range(0..table.len());
                VehicleView {
                    id: VehicleId(1_000 + n as u64),
                    position: table.marker(idx),
                    speed: 0.0,
                    is_car: true,
                    collided: false,
                    occupants: Vec::new(),
                }
            })
            .collect();
        Self {
            settings,
            rng,
            driver: VehicleView {
                id: DRIVER_VEHICLE,
                position: GeoPoint::default(),
                speed: 0.0,
                is_car: true,
                collided: false,
                occupants: Vec::new(),
            },
            cruise_speed: MIN_CRUISE_SPEED,
            parked,
            agents: HashMap::new(),
            indicators: BTreeMap::new(),
            next_id: 1_000_000,
            frames: 0,
            paid: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn parked_cars(&self) -> usize {
        self.parked.len()
    }

    /// Advance the host by one frame: drive, collide and seat walking riders.
    pub fn step(&mut self) {
        let dt = self.settings.frame_secs;
        self.frames += 1;
        self.driver.collided = false;

        match self.navigation_target() {
            Some(target) => self.drive_toward(target, dt),
            None => self.driver.speed = 0.0,
        }
        let collision_chance = (self.settings.collision_rate * f64::from(dt)).clamp(0.0, 1.0);
        if self.driver.speed > 0.0 && self.rng.gen_bool(collision_chance) {
            debug!(speed = self.driver.speed, "scripted collision");
            self.driver.collided = true;
        }

        let loss_chance = (self.settings.rider_loss_rate * f64::from(dt)).clamp(0.0, 1.0);
        let mut seated = Vec::new();
        for (agent, state) in self.agents.iter_mut() {
            let on_street = state.alive && !self.driver.occupants.contains(agent);
            if on_street && self.rng.gen_bool(loss_chance) {
                info!(?agent, "rider lost on the street");
                state.alive = false;
            }
            if let Some(remaining) = state.boarding_in.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    state.boarding_in = None;
                    seated.push(*agent);
                }
            }
        }
        for agent in seated {
            if !self.driver.carries(agent) {
                self.driver.occupants.push(agent);
            }
        }
    }

    /// Destination first, otherwise the waiting rider.
    fn navigation_target(&self) -> Option<GeoPoint> {
        let find = |kind: IndicatorKind| {
            self.indicators
                .values()
                .find(|spec| spec.kind == kind && spec.show_route)
                .map(|spec| spec.position)
        };
        find(IndicatorKind::Destination).or_else(|| find(IndicatorKind::Rider))
    }

    fn drive_toward(&mut self, target: GeoPoint, dt: f32) {
        let remaining = self.driver.position.distance_to(&target);
        if remaining < 0.5 {
            self.driver.speed = 0.0;
            return;
        }
        if self.driver.speed == 0.0 {
            self.cruise_speed = self.rng.gen_range(MIN_CRUISE_SPEED..MAX_CRUISE_SPEED);
        }
        self.driver.speed = self.cruise_speed;
        let step = (self.cruise_speed * dt).min(remaining);
        let ratio = step / remaining;
        let from = self.driver.position;
        self.driver.position = GeoPoint::new(
            from.x + (target.x - from.x) * ratio,
            from.y + (target.y - from.y) * ratio,
            from.z + (target.z - from.z) * ratio,
        );
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl SpatialOracle for ScriptedHost {
    /// Roads run along the axes.
    fn travel_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        (from.x - to.x).abs() + (from.y - to.y).abs()
    }

    fn straight_line_distance(&self, from: GeoPoint, to: GeoPoint) -> f32 {
        from.distance_to(&to)
    }

    fn ground_height(&self, _x: f32, _y: f32) -> Option<f32> {
        Some(0.0)
    }
}

impl AgentHost for ScriptedHost {
    fn frame_delta_secs(&self) -> f32 {
        self.settings.frame_secs
    }

    fn driver(&self) -> DriverView {
        DriverView {
            position: self.driver.position,
            vehicle: Some(self.driver.clone()),
        }
    }

    fn abort_requested(&mut self) -> bool {
        false
    }

    fn spawn_rider(&mut self, _at: GeoPoint, _heading: f32) -> Option<AgentId> {
        let agent = AgentId(self.next_id());
        self.agents.insert(
            agent,
            SimAgent {
                alive: true,
                boarding_in: None,
            },
        );
        Some(agent)
    }

    fn delete_agent(&mut self, agent: AgentId) {
        self.agents.remove(&agent);
        self.driver.occupants.retain(|occupant| *occupant != agent);
    }

    fn agent_alive(&self, agent: AgentId) -> bool {
        self.agents.get(&agent).is_some_and(|state| state.alive)
    }

    fn issue_intent(&mut self, agent: AgentId, intent: RiderIntent) {
        let walk = self.rng.gen_range(MIN_WALK_SECS..MAX_WALK_SECS);
        let Some(state) = self.agents.get_mut(&agent) else {
            return;
        };
        match intent {
            RiderIntent::EnterVehicle { timeout_secs, .. } => {
                state.boarding_in = Some(walk.min(timeout_secs));
            }
            RiderIntent::LeaveVehicle => {
                state.boarding_in = None;
                self.driver.occupants.retain(|occupant| *occupant != agent);
            }
            RiderIntent::Wander | RiderIntent::SetInvincible(_) => {}
        }
    }

    fn vehicle_position(&self, vehicle: VehicleId) -> Option<GeoPoint> {
        if vehicle == self.driver.id {
            return Some(self.driver.position);
        }
        self.parked
            .iter()
            .find(|parked| parked.id == vehicle)
            .map(|parked| parked.position)
    }

    fn nearby_vehicles(&self, at: GeoPoint, radius: f32) -> Vec<VehicleView> {
        std::iter::once(&self.driver)
            .chain(self.parked.iter())
            .filter(|vehicle| vehicle.position.distance_to(&at) < radius)
            .cloned()
            .collect()
    }

    fn delete_vehicle(&mut self, vehicle: VehicleId) {
        self.parked.retain(|parked| parked.id != vehicle);
    }

    fn set_vehicle_speed(&mut self, vehicle: VehicleId, speed: f32) {
        if vehicle == self.driver.id {
            self.driver.speed = speed.max(0.0);
        }
    }

    fn restrict_vehicle_controls(&mut self) {}

    fn draw_marker(&mut self, _at: GeoPoint) {}

    fn pay_driver(&mut self, amount: i64) {
        self.paid += amount;
    }
}

impl MapIndicators for ScriptedHost {
    fn create_indicator(&mut self, spec: IndicatorSpec) -> IndicatorHandle {
        let handle = IndicatorHandle(self.next_id());
        self.indicators.insert(handle, spec);
        handle
    }

    fn delete_indicator(&mut self, handle: IndicatorHandle) {
        self.indicators.remove(&handle);
    }

    fn toggle_route(&mut self, _handle: IndicatorHandle) {}
}

impl Notifier for ScriptedHost {
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::EnterCar | Notice::ReturnToCar => {}
            other => info!(notice = %other, "host notice"),
        }
    }
}

/// Square grid of `side * side` locations `spacing_miles` apart, centred on
/// the origin. The southern half is city.
pub fn generated_table(
    side: usize,
    spacing_miles: f32,
) -> Result<LocationTable, LocationTableError> {
    let half = (side as f32 - 1.0) / 2.0;
    let spacing = spacing_miles * UNITS_PER_MILE;
    let (spawns, markers) = (0..side * side)
        .map(|idx| {
            let position = GeoPoint::new(
                ((idx % side) as f32 - half) * spacing,
                ((idx / side) as f32 - half) * spacing,
                0.0,
            );
            let spawn = SpawnPoint {
                position,
                heading: (idx * 45 % 360) as f32,
            };
            let marker = GeoPoint::new(position.x + MARKER_OFFSET, position.y, 0.0);
            (spawn, marker)
        })
        .unzip();
    LocationTable::new(spawns, markers, side * side / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ScriptedHost {
        let table = generated_table(5, 0.1).expect("table");
        ScriptedHost::new(
            HostSettings {
                collision_rate: 0.0,
                parked_cars: 0,
                ..HostSettings::default()
            },
            &table,
            Some(1),
        )
    }

    #[test]
    fn road_distance_is_never_shorter_than_straight_line() {
        let host = host();
        let from = GeoPoint::new(0.0, 0.0, 0.0);
        let to = GeoPoint::new(30.0, -40.0, 0.0);
        assert_eq!(host.travel_distance(from, to), 70.0);
        assert_eq!(host.straight_line_distance(from, to), 50.0);
    }

    #[test]
    fn driver_follows_the_rider_indicator_and_stops() {
        let mut host = host();
        let target = GeoPoint::new(20.0, 0.0, 0.0);
        host.create_indicator(IndicatorSpec {
            kind: IndicatorKind::Rider,
            position: target,
            show_route: true,
        });
        for _ in 0..2_000 {
            host.step();
        }
        let driver = host.driver();
        assert!(driver.position.distance_to(&target) < 0.5);
        assert_eq!(driver.vehicle.expect("car").speed, 0.0);
    }

    #[test]
    fn rider_takes_a_seat_after_walking() {
        let mut host = host();
        let agent = host.spawn_rider(GeoPoint::default(), 0.0).expect("agent");
        host.issue_intent(
            agent,
            RiderIntent::EnterVehicle {
                vehicle: DRIVER_VEHICLE,
                timeout_secs: 10.0,
                seat: ride_core::host::Seat::Passenger,
            },
        );
        assert!(!host.driver().vehicle.expect("car").carries(agent));
        for _ in 0..(MAX_WALK_SECS * 30.0) as usize + 2 {
            host.step();
        }
        assert!(host.driver().vehicle.expect("car").carries(agent));

        host.issue_intent(agent, RiderIntent::LeaveVehicle);
        assert!(!host.driver().vehicle.expect("car").carries(agent));
    }

    #[test]
    fn generated_markers_sit_inside_the_activation_radius() {
        let table = generated_table(4, 0.2).expect("table");
        assert_eq!(table.len(), 16);
        assert_eq!(table.city_boundary(), 8);
        for idx in 0..table.len() {
            assert!(table.spawn(idx).position.distance_to(&table.marker(idx)) < 3.0);
        }
    }
}
