#![allow(dead_code)]

use bevy_ecs::prelude::World;
use ride_core::geo::GeoPoint;
use ride_core::host::AgentId;
use ride_core::ride::RideState;

use super::schedule::TickRunner;
use super::world::{host_mut, lifecycle, state, trip};

/// Tick until a rider waits at the pickup.
pub fn spawn_rider(runner: &mut TickRunner, world: &mut World) -> AgentId {
    runner
        .tick_until(world, 200, |world| state(world) == RideState::RiderWaitingAtPickup)
        .expect("rider spawned");
    lifecycle(world).rider_agent().expect("rider")
}

/// Park just outside the activation radius, close enough to see the pickup marker.
pub fn approach_pickup(world: &mut World) -> GeoPoint {
    let pickup = trip(world).pickup_marker;
    {
        let mut host = host_mut(world);
        host.move_driver(GeoPoint::new(pickup.x + 10.0, pickup.y, pickup.z));
        host.set_speed(0.0);
    }
    pickup
}

/// Drive to the pickup, stop, and tick until the rider is onboard.
pub fn board(runner: &mut TickRunner, world: &mut World) {
    let pickup = trip(world).pickup_marker;
    {
        let mut host = host_mut(world);
        host.move_driver(pickup);
        host.set_speed(0.0);
    }
    runner
        .tick_until(world, 5, |world| state(world) == RideState::EnRouteToDropoff)
        .expect("rider boarded");
}

/// Drive to the drop-off, stop, and tick once to settle the ride.
pub fn drop_off(runner: &mut TickRunner, world: &mut World) {
    let dropoff = trip(world).dropoff_marker;
    {
        let mut host = host_mut(world);
        host.move_driver(dropoff);
        host.set_speed(0.0);
    }
    runner.tick(world);
    assert_eq!(state(world), RideState::DroppedOff);
}

/// Run one complete ride, ending in the drop-off cooldown.
pub fn complete_ride(runner: &mut TickRunner, world: &mut World) -> AgentId {
    let rider = spawn_rider(runner, world);
    board(runner, world);
    drop_off(runner, world);
    rider
}
