//! Per-tick systems, chained by [crate::runner::ride_schedule] in this order:
//! rider check, predicates, rider intents, route refresh, markers, marker
//! clean-up, incidents, dispatch, drop-off cooldown, notifications.

pub mod dispatch;
pub mod dropoff_cooldown;
pub mod incident_check;
pub mod marker_cleanup;
pub mod markers;
pub mod notifications;
pub mod predicates;
pub mod rider_check;
pub mod rider_intents;
pub mod route_refresh;
