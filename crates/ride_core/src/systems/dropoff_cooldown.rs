use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::TickClock;
use crate::config::RideConfig;
use crate::host::{HostResource, RideHost};
use crate::ride::{RideLifecycle, RideState};

/// After a drop-off, holds the vehicle for the control-lock window so the
/// rider can climb out, then returns the ride to `Idle` at the reset window.
pub fn dropoff_cooldown_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    mut lifecycle: ResMut<RideLifecycle>,
    clock: Res<TickClock>,
    config: Res<RideConfig>,
) {
    if lifecycle.state != RideState::DroppedOff {
        return;
    }
    let lifecycle = &mut *lifecycle;
    // The drop-off tick only arms the window; time counts from the next tick.
    if !lifecycle.dropoff_cooldown.is_active() {
        lifecycle.dropoff_cooldown.arm();
    } else if lifecycle.dropoff_cooldown.advance(clock.delta_secs()) {
        lifecycle.finish_cooldown();
        return;
    }
    if lifecycle.dropoff_cooldown.elapsed_secs() <= config.dropoff_control_lock_secs {
        host.restrict_vehicle_controls();
    }
}
