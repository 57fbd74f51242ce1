//! Rider intents: boarding, boarding confirmation, drop-off and the braking
//! assist near markers.
//!
//! All decisions read this tick's [TickPredicates]; the host is only told what
//! to do, never re-queried, so an intent issued here cannot influence another
//! decision until the next tick.

use bevy_ecs::prelude::{Res, ResMut};
use tracing::{info, warn};

use crate::assignment::Assignment;
use crate::clock::FrameInput;
use crate::config::RideConfig;
use crate::host::{HostResource, IndicatorKind, IndicatorSpec, RideHost, RiderIntent, Seat};
use crate::notice::Notice;
use crate::pricing::FareCalculator;
use crate::ride::{RideLifecycle, RideState, TickPredicates};
use crate::settings::{DriverSettings, DriverStats};
use crate::store::StoreResource;
use crate::telemetry::RideTelemetry;

/// Speed at or above which the braking assist takes off 2 units per tick.
const HARD_BRAKE_SPEED: f32 = 25.0;
/// Speed below which the vehicle is stopped outright.
const STOP_SPEED: f32 = 1.0;

#[allow(clippy::too_many_arguments)]
pub fn rider_intent_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    predicates: Res<TickPredicates>,
    frame: Res<FrameInput>,
    config: Res<RideConfig>,
    settings: Res<DriverSettings>,
    mut stats: ResMut<DriverStats>,
    mut store: ResMut<StoreResource>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    let host = &mut host.0;
    let lifecycle = &mut *lifecycle;
    let Some(trip) = lifecycle.trip else {
        return;
    };
    let fares = FareCalculator::new(config.distance_policy());

    issue_boarding(host, lifecycle, &predicates, &frame, &config);
    confirm_boarding(host, lifecycle, &predicates, &frame, &trip, &fares, &settings);
    if should_drop_off(lifecycle, &predicates) {
        drop_off(
            host,
            lifecycle,
            &trip,
            &fares,
            &settings,
            &mut stats,
            &mut store,
            &mut telemetry,
        );
    }
    brake_near_marker(host, lifecycle, &predicates, &frame);
}

fn issue_boarding<H: RideHost>(
    host: &mut H,
    lifecycle: &mut RideLifecycle,
    predicates: &TickPredicates,
    frame: &FrameInput,
    config: &RideConfig,
) {
    if lifecycle.state != RideState::RiderWaitingAtPickup
        || !(predicates.in_car && predicates.stationary && predicates.at_pickup)
    {
        return;
    }
    let (Some(rider), Some(vehicle)) = (lifecycle.rider.as_mut(), frame.vehicle_id()) else {
        return;
    };
    if rider.boarding_issued {
        return;
    }

    host.issue_intent(rider.agent, RiderIntent::SetInvincible(true));
    host.issue_intent(
        rider.agent,
        RiderIntent::EnterVehicle {
            vehicle,
            timeout_secs: config.boarding_timeout_secs,
            seat: Seat::Passenger,
        },
    );
    rider.boarding_issued = true;
    lifecycle.set_state(RideState::RiderBoarding);
}

fn confirm_boarding<H: RideHost>(
    host: &mut H,
    lifecycle: &mut RideLifecycle,
    predicates: &TickPredicates,
    frame: &FrameInput,
    trip: &Assignment,
    fares: &FareCalculator,
    settings: &DriverSettings,
) {
    if lifecycle.state != RideState::RiderBoarding
        || !(predicates.rider_in_vehicle && predicates.at_pickup)
    {
        return;
    }
    let Some(vehicle) = frame.vehicle_id() else {
        return;
    };

    if let Some(handle) = lifecycle.indicators.rider.take() {
        host.delete_indicator(handle);
    }
    if lifecycle.indicators.destination.is_none() {
        lifecycle.indicators.destination = Some(host.create_indicator(IndicatorSpec {
            kind: IndicatorKind::Destination,
            position: trip.dropoff_marker,
            show_route: true,
        }));
    }
    if let Some(rider) = lifecycle.rider.as_mut() {
        rider.onboard = true;
        rider.assigned_vehicle = Some(vehicle);
    }
    lifecycle.incidents.reset();

    let (distance, payment) = fares.quote(
        &*host,
        trip.pickup_marker,
        trip.dropoff_marker,
        settings.pay_rate_per_mile,
    );
    host.notify(Notice::TripQuote {
        distance_miles: distance.miles,
        payment,
    });

    lifecycle.set_state(RideState::OnboardAwaitingDestination);
    lifecycle.set_state(RideState::EnRouteToDropoff);
}

fn should_drop_off(lifecycle: &RideLifecycle, predicates: &TickPredicates) -> bool {
    lifecycle.state == RideState::EnRouteToDropoff
        && lifecycle.rider_onboard()
        && predicates.in_trip_vehicle
        && predicates.stationary
        && predicates.at_dropoff
}

#[allow(clippy::too_many_arguments)]
fn drop_off<H: RideHost>(
    host: &mut H,
    lifecycle: &mut RideLifecycle,
    trip: &Assignment,
    fares: &FareCalculator,
    settings: &DriverSettings,
    stats: &mut DriverStats,
    store: &mut StoreResource,
    telemetry: &mut RideTelemetry,
) {
    let Some(rider) = lifecycle.rider.take() else {
        return;
    };

    let record = fares.settle(
        &*host,
        trip.pickup_marker,
        trip.dropoff_marker,
        lifecycle.incidents.counters_mut(),
        settings,
        stats.average_rating,
    );
    host.pay_driver(record.total_paid());

    host.issue_intent(rider.agent, RiderIntent::LeaveVehicle);
    host.issue_intent(rider.agent, RiderIntent::SetInvincible(false));
    host.issue_intent(rider.agent, RiderIntent::Wander);
    if let Some(previous) = lifecycle.pending_removal.replace(rider.agent) {
        host.delete_agent(previous);
    }
    for handle in [
        lifecycle.indicators.destination.take(),
        lifecycle.indicators.car.take(),
    ]
    .into_iter()
    .flatten()
    {
        host.delete_indicator(handle);
    }

    stats.record_ride(record.payment, record.rating);
    if let Err(err) = store.save_stats(stats) {
        warn!(%err, "failed to save driver stats");
        host.notify(Notice::StoreFailure(err.to_string()));
    }
    host.notify(Notice::RideSummary {
        rating: record.rating,
        payment: record.payment,
        tip: record.tip,
    });
    info!(
        miles = record.distance_miles,
        source = ?record.distance_source,
        payment = record.payment,
        tip = record.tip,
        rating = record.rating,
        "ride completed"
    );
    telemetry.record_ride(record);
    lifecycle.set_state(RideState::DroppedOff);
}

fn brake_near_marker<H: RideHost>(
    host: &mut H,
    lifecycle: &RideLifecycle,
    predicates: &TickPredicates,
    frame: &FrameInput,
) {
    let braking = match lifecycle.state {
        RideState::RiderWaitingAtPickup | RideState::RiderBoarding => {
            predicates.in_car && predicates.at_pickup
        }
        RideState::EnRouteToDropoff => predicates.in_trip_vehicle && predicates.at_dropoff,
        _ => false,
    };
    let Some(vehicle) = frame.vehicle_id().filter(|_| braking) else {
        return;
    };

    let speed = predicates.vehicle_speed;
    if speed >= HARD_BRAKE_SPEED {
        host.set_vehicle_speed(vehicle, speed - 2.0);
    } else if speed >= STOP_SPEED {
        host.set_vehicle_speed(vehicle, speed - 1.0);
    } else {
        host.set_vehicle_speed(vehicle, 0.0);
        host.restrict_vehicle_controls();
    }
}
