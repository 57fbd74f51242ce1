//! Ride runner: samples the host and runs the per-tick schedule.
//!
//! Host sampling and duty handling happen here, outside systems. Each tick
//! advances [TickClock], stores the driver snapshot as [FrameInput], then runs
//! the chained schedule once. Off duty, a tick only tears the ride down.

use bevy_ecs::prelude::{Mut, Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use tracing::{info, warn};

use crate::clock::{FrameInput, TickClock};
use crate::host::{HostResource, RideHost};
use crate::notice::Notice;
use crate::ride::{DutyStatus, RideLifecycle};
use crate::settings::DriverSettings;
use crate::store::StoreResource;
use crate::systems::{
    dispatch::dispatch_system, dropoff_cooldown::dropoff_cooldown_system,
    incident_check::incident_check_system, marker_cleanup::marker_cleanup_system,
    markers::marker_system, notifications::notification_system,
    predicates::evaluate_predicates_system, rider_check::rider_check_system,
    rider_intents::rider_intent_system, route_refresh::route_refresh_system,
};
use crate::telemetry::RideTelemetry;

/// Builds the per-tick schedule. Systems run strictly in sequence on one thread.
pub fn ride_schedule<H: RideHost>() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            rider_check_system::<H>,
            evaluate_predicates_system,
            rider_intent_system::<H>,
            route_refresh_system::<H>,
            marker_system::<H>,
            marker_cleanup_system::<H>,
            incident_check_system::<H>,
            dispatch_system::<H>,
            dropoff_cooldown_system::<H>,
            notification_system::<H>,
        )
            .chain(),
    );
    schedule
}

/// Runs one tick. Returns `true` if the ride schedule ran, `false` if the
/// driver is off duty and the tick only tore the ride down.
pub fn run_tick<H: RideHost>(world: &mut World, schedule: &mut Schedule) -> bool {
    let (delta_secs, driver, interrupted) = {
        let mut host = world.resource_mut::<HostResource<H>>();
        let interrupted = host.abort_requested();
        (host.frame_delta_secs(), host.driver(), interrupted)
    };
    world.resource_mut::<TickClock>().advance(delta_secs);
    world.resource_mut::<FrameInput>().driver = driver;

    if interrupted {
        info!("host interrupt, going off duty");
        *world.resource_mut::<DutyStatus>() = DutyStatus::Unavailable;
    }
    if *world.resource::<DutyStatus>() == DutyStatus::Unavailable {
        teardown::<H>(world);
        return false;
    }

    schedule.run(world);
    true
}

/// Runs `ticks` ticks and returns how many of them ran the ride schedule.
pub fn run_ticks<H: RideHost>(world: &mut World, schedule: &mut Schedule, ticks: usize) -> usize {
    (0..ticks)
        .filter(|_| run_tick::<H>(world, schedule))
        .count()
}

/// Full teardown of the current ride. Idempotent.
pub fn teardown<H: RideHost>(world: &mut World) {
    world.resource_scope(|world, mut lifecycle: Mut<RideLifecycle>| {
        let discarded = {
            let mut host = world.resource_mut::<HostResource<H>>();
            lifecycle.teardown(&mut host.0)
        };
        if discarded {
            world.resource_mut::<RideTelemetry>().rides_aborted += 1;
        }
    });
}

/// Script shutdown: nothing the ride owns may outlive it.
pub fn shutdown<H: RideHost>(world: &mut World) {
    info!("shutting down ride loop");
    teardown::<H>(world);
}

pub fn set_duty_status<H: RideHost>(world: &mut World, status: DutyStatus) {
    let previous = std::mem::replace(&mut *world.resource_mut::<DutyStatus>(), status);
    if previous != status {
        info!(?status, "duty status changed");
    }
    if status == DutyStatus::Unavailable {
        teardown::<H>(world);
    }
}

/// Apply settings chosen in the driver menu and persist them. A failed save
/// keeps the new values in memory and tells the driver.
pub fn update_settings<H: RideHost>(world: &mut World, settings: DriverSettings) {
    *world.resource_mut::<DriverSettings>() = settings;
    let saved = world.resource_mut::<StoreResource>().save_settings(&settings);
    if let Err(err) = saved {
        warn!(%err, "failed to save driver settings");
        world
            .resource_mut::<HostResource<H>>()
            .notify(Notice::StoreFailure(err.to_string()));
    }
}
