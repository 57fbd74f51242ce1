use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::TickClock;
use crate::host::{HostResource, RideHost};
use crate::notice::Notice;
use crate::ride::{RideLifecycle, RideState, TickPredicates};
use crate::telemetry::RideTelemetry;

/// Counts collisions while the rider rides with the driver. The tracker's
/// cooldown advances every tick, monitored or not.
pub fn incident_check_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    predicates: Res<TickPredicates>,
    clock: Res<TickClock>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    let monitoring = lifecycle.state == RideState::EnRouteToDropoff
        && lifecycle.rider_onboard()
        && predicates.in_trip_vehicle;
    let recorded = lifecycle.incidents.observe(
        monitoring,
        predicates.vehicle_speed,
        predicates.collided,
        clock.delta_secs(),
    );
    if let Some(severity) = recorded {
        debug!(?severity, speed = predicates.vehicle_speed, "incident");
        host.notify(Notice::Incident(severity));
        telemetry.record_incident(severity);
    }
}
