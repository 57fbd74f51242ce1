use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::FrameInput;
use crate::config::RideConfig;
use crate::geo::GeoPoint;
use crate::ride::{RideLifecycle, TickPredicates};

/// Evaluates every spatial and vehicle predicate once, before any intent is
/// issued. Later systems read [TickPredicates] and never re-query the host.
pub fn evaluate_predicates_system(
    frame: Res<FrameInput>,
    config: Res<RideConfig>,
    lifecycle: Res<RideLifecycle>,
    mut predicates: ResMut<TickPredicates>,
) {
    let driver = &frame.driver;
    let vehicle = driver.vehicle.as_ref();
    let within = |target: Option<GeoPoint>, radius: f32| {
        target.is_some_and(|point| driver.position.distance_to(&point) < radius)
    };
    let pickup = lifecycle.trip.map(|trip| trip.pickup_marker);
    let dropoff = lifecycle.trip.map(|trip| trip.dropoff_marker);

    *predicates = TickPredicates {
        in_car: vehicle.is_some_and(|vehicle| vehicle.is_car),
        vehicle_speed: vehicle.map_or(0.0, |vehicle| vehicle.speed),
        stationary: vehicle.is_some_and(|vehicle| config.is_stationary(vehicle.speed)),
        collided: vehicle.is_some_and(|vehicle| vehicle.collided),
        at_pickup: within(pickup, config.activation_radius),
        at_dropoff: within(dropoff, config.activation_radius),
        pickup_visible: within(pickup, config.marker_visibility_radius),
        dropoff_visible: within(dropoff, config.marker_visibility_radius),
        rider_in_vehicle: match (vehicle, lifecycle.rider_agent()) {
            (Some(vehicle), Some(agent)) => vehicle.carries(agent),
            _ => false,
        },
        in_trip_vehicle: match (vehicle, lifecycle.trip_vehicle()) {
            (Some(vehicle), Some(trip_vehicle)) => vehicle.id == trip_vehicle,
            _ => false,
        },
    };
}
