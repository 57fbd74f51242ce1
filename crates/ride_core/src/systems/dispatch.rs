//! Dispatch: starts a search when idle, advances the assignment engine by one
//! quota and spawns the rider once a pair is committed.

use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::FrameInput;
use crate::host::{HostResource, IndicatorKind, IndicatorSpec, RideHost};
use crate::ride::{RideLifecycle, RideState, Rider};
use crate::session::RideRng;
use crate::settings::DriverSettings;
use crate::telemetry::RideTelemetry;

pub fn dispatch_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    frame: Res<FrameInput>,
    settings: Res<DriverSettings>,
    mut rng: ResMut<RideRng>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    let host = &mut host.0;
    let lifecycle = &mut *lifecycle;

    if lifecycle.state == RideState::Idle
        && lifecycle.rider.is_none()
        && !lifecycle.dropoff_cooldown.is_active()
    {
        lifecycle.set_state(RideState::Searching);
    }

    if lifecycle.state == RideState::Searching {
        lifecycle.engine.advance(
            frame.driver.position,
            &*host,
            &mut rng.0,
            settings.region_policy,
        );
        if let Some(assignment) = lifecycle.engine.commit() {
            debug!(
                pickup_idx = assignment.pickup_idx,
                dropoff_idx = assignment.dropoff_idx,
                "assignment committed"
            );
            lifecycle.trip = Some(assignment);
            lifecycle.set_state(RideState::AwaitingSpawn);
        }
    }

    if lifecycle.state == RideState::AwaitingSpawn {
        spawn_rider(host, lifecycle, &mut telemetry);
    }
}

fn spawn_rider<H: RideHost>(
    host: &mut H,
    lifecycle: &mut RideLifecycle,
    telemetry: &mut RideTelemetry,
) {
    let Some(trip) = lifecycle.trip else {
        lifecycle.set_state(RideState::Idle);
        return;
    };
    if let Some(previous) = lifecycle.pending_removal.take() {
        host.delete_agent(previous);
    }
    let Some(agent) = host.spawn_rider(trip.spawn.position, trip.spawn.heading) else {
        debug!("rider spawn failed, retrying next tick");
        return;
    };

    lifecycle.rider = Some(Rider::new(agent));
    let indicator = host.create_indicator(IndicatorSpec {
        kind: IndicatorKind::Rider,
        position: trip.spawn.position,
        show_route: true,
    });
    if let Some(stale) = lifecycle.indicators.rider.replace(indicator) {
        host.delete_indicator(stale);
    }
    telemetry.rides_started += 1;
    lifecycle.set_state(RideState::RiderWaitingAtPickup);
}
