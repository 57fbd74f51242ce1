use bevy_ecs::prelude::{Res, ResMut};

use crate::host::{HostResource, RideHost};
use crate::notice::Notice;
use crate::ride::{RideLifecycle, TickPredicates};

pub fn notification_system<H: RideHost>(
    mut host: ResMut<HostResource<H>>,
    lifecycle: Res<RideLifecycle>,
    predicates: Res<TickPredicates>,
) {
    if lifecycle.rider.is_some() && !predicates.in_car {
        host.notify(Notice::EnterCar);
    }
    if lifecycle.indicators.car.is_some() {
        host.notify(Notice::ReturnToCar);
    }
}
