use bevy_ecs::prelude::ResMut;
use tracing::warn;

use crate::host::{HostResource, RideHost};
use crate::ride::RideLifecycle;
use crate::telemetry::RideTelemetry;

/// Tears the ride down when the host reports the rider is no longer alive.
pub fn rider_check_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    mut telemetry: ResMut<RideTelemetry>,
) {
    let Some(agent) = lifecycle.rider_agent() else {
        return;
    };
    if host.agent_alive(agent) {
        return;
    }

    warn!(?agent, state = ?lifecycle.state, "rider lost");
    if lifecycle.teardown(&mut host.0) {
        telemetry.rides_aborted += 1;
    }
}
