//! On-demand ride dispatch for a real-time host.
//!
//! Each host frame is one tick: [runner::run_tick] samples the host and runs
//! the chained [runner::ride_schedule]. Everything the ride owns lives in a
//! `bevy_ecs` world built by [session::build_ride_world].

pub mod assignment;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod geo;
pub mod host;
pub mod incidents;
pub mod locations;
pub mod notice;
pub mod pricing;
pub mod ride;
pub mod route_refresh;
pub mod runner;
pub mod session;
pub mod settings;
pub mod store;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
