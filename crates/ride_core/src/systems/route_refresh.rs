use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::TickClock;
use crate::host::{HostResource, RideHost};
use crate::ride::RideLifecycle;

pub fn route_refresh_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    clock: Res<TickClock>,
) {
    let lifecycle = &mut *lifecycle;
    if lifecycle.indicators.is_empty() {
        lifecycle.route_refresh.reset();
        return;
    }
    if let Some(handle) = lifecycle
        .route_refresh
        .tick(clock.delta_secs(), &lifecycle.indicators)
    {
        host.toggle_route(handle);
    }
}
