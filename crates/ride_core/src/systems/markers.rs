//! Per-tick 3D markers and the car indicator.
//!
//! Markers have no persistent object on the host side, so they are redrawn
//! every tick they should be visible. The car indicator is persistent and only
//! created or deleted when the driver leaves or re-enters the trip vehicle.

use bevy_ecs::prelude::{Res, ResMut, Resource};

use crate::clock::FrameInput;
use crate::geo::GeoPoint;
use crate::host::{HostResource, IndicatorKind, IndicatorSpec, RideHost, SpatialOracle};
use crate::ride::{RideLifecycle, RideState, TickPredicates};

/// Markers drawn this tick, at the height they were drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Resource)]
pub struct MarkersDrawn {
    pub pickup: Option<GeoPoint>,
    pub dropoff: Option<GeoPoint>,
}

pub fn marker_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    predicates: Res<TickPredicates>,
    frame: Res<FrameInput>,
    mut drawn: ResMut<MarkersDrawn>,
) {
    let host = &mut host.0;
    *drawn = MarkersDrawn::default();

    if let Some(trip) = lifecycle.trip {
        if lifecycle.state == RideState::RiderWaitingAtPickup && predicates.pickup_visible {
            let at = on_ground(&*host, trip.pickup_marker);
            host.draw_marker(at);
            drawn.pickup = Some(at);
        }
        if lifecycle.rider_onboard() && predicates.dropoff_visible {
            let at = on_ground(&*host, trip.dropoff_marker);
            host.draw_marker(at);
            drawn.dropoff = Some(at);
        }
    }

    update_car_indicator(host, &mut lifecycle, &frame);
}

fn on_ground<O: SpatialOracle + ?Sized>(oracle: &O, point: GeoPoint) -> GeoPoint {
    oracle
        .ground_height(point.x, point.y)
        .map_or(point, |z| point.with_z(z))
}

fn update_car_indicator<H: RideHost>(
    host: &mut H,
    lifecycle: &mut RideLifecycle,
    frame: &FrameInput,
) {
    // read the frame, not the predicates: the vehicle may have been latched this tick
    let driver_left_car =
        lifecycle.rider_onboard() && frame.vehicle_id() != lifecycle.trip_vehicle();
    match (driver_left_car, lifecycle.indicators.car) {
        (true, None) => {
            let position = lifecycle
                .trip_vehicle()
                .and_then(|vehicle| host.vehicle_position(vehicle));
            if let Some(position) = position {
                lifecycle.indicators.car = Some(host.create_indicator(IndicatorSpec {
                    kind: IndicatorKind::Car,
                    position,
                    show_route: false,
                }));
            }
        }
        (false, Some(_)) => {
            if let Some(handle) = lifecycle.indicators.car.take() {
                host.delete_indicator(handle);
            }
        }
        _ => {}
    }
}
