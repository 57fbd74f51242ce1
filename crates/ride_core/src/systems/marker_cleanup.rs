use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::FrameInput;
use crate::config::RideConfig;
use crate::host::{HostResource, RideHost, VehicleId};
use crate::ride::RideLifecycle;
use crate::systems::markers::MarkersDrawn;

/// Removes parked, empty vehicles sitting on a drawn marker so the driver can
/// always pull up to it. The driver's own and the trip vehicle are never touched.
pub fn marker_cleanup_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    drawn: Res<MarkersDrawn>,
    frame: Res<FrameInput>,
    lifecycle: Res<RideLifecycle>,
    config: Res<RideConfig>,
) {
    let keep = [frame.vehicle_id(), lifecycle.trip_vehicle()];
    for marker in [drawn.pickup, drawn.dropoff].into_iter().flatten() {
        let parked: Vec<VehicleId> = host
            .nearby_vehicles(marker, config.activation_radius)
            .into_iter()
            .filter(|vehicle| {
                vehicle.occupants.is_empty()
                    && config.is_stationary(vehicle.speed)
                    && !keep.contains(&Some(vehicle.id))
            })
            .map(|vehicle| vehicle.id)
            .collect();
        for vehicle in parked {
            debug!(?vehicle, "removing parked vehicle from marker");
            host.delete_vehicle(vehicle);
        }
    }
}
