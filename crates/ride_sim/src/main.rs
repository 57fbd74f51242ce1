//! Headless ride dispatch: runs the ride loop against a scripted host and
//! prints a JSON summary of the session.

mod scripted;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::prelude::World;
use clap::Parser;
use ride_core::clock::TickClock;
use ride_core::host::HostResource;
use ride_core::locations::LocationTable;
use ride_core::runner::{ride_schedule, run_tick, shutdown};
use ride_core::session::{build_ride_world, SessionParams};
use ride_core::settings::DriverStats;
use ride_core::store::{IniFileStore, MemoryStore, SettingsStore};
use ride_core::telemetry::RideTelemetry;
use serde::Serialize;
use tracing::{info, warn};

use crate::scripted::{generated_table, HostSettings, ScriptedHost};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ride_sim",
    about = "Run the ride dispatch loop against a scripted driver",
    long_about = "Runs complete rides against a synthetic host (a driver following\n\
                  route indicators over a Manhattan road grid) and prints the\n\
                  session telemetry as JSON."
)]
struct Args {
    /// Stop after this many completed rides
    #[arg(long, default_value_t = 5)]
    rides: usize,
    /// Seed for assignment and the scripted host; entropy when omitted
    #[arg(long, env = "RIDE_SIM_SEED")]
    seed: Option<u64>,
    /// Location table CSV (spawn_x,spawn_y,spawn_z,heading,marker_x,marker_y,marker_z)
    #[arg(long, requires = "city_boundary")]
    locations: Option<PathBuf>,
    /// Number of leading city entries in the location table CSV
    #[arg(long)]
    city_boundary: Option<usize>,
    /// Side of the generated location grid when no CSV is given
    #[arg(long, default_value_t = 25)]
    grid_side: usize,
    /// Spacing of the generated location grid, in miles
    #[arg(long, default_value_t = 0.08)]
    grid_spacing_miles: f32,
    /// Driver settings/stats INI file; kept in memory when omitted
    #[arg(long, env = "RIDE_SIM_SETTINGS")]
    settings: Option<PathBuf>,
    /// Session parameters as JSON (`{"seed": .., "config": {..}}`)
    #[arg(long)]
    params: Option<PathBuf>,
    /// Give up after this many ticks
    #[arg(long, default_value_t = 2_000_000)]
    max_ticks: u64,
    /// Host frame rate
    #[arg(long, default_value_t = 30.0)]
    fps: f32,
    /// Expected collisions per second of driving
    #[arg(long, default_value_t = 0.02)]
    collision_rate: f64,
    /// Chance per second that a waiting rider is lost
    #[arg(long, default_value_t = 0.0)]
    rider_loss_rate: f64,
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    ticks: u64,
    simulated_secs: f64,
    rides_completed: usize,
    average_rating: Option<f32>,
    paid_to_driver: i64,
    stats: DriverStats,
    telemetry: RideTelemetry,
}

fn load_table(args: &Args) -> Result<LocationTable, Box<dyn Error>> {
    let table = match (&args.locations, args.city_boundary) {
        (Some(path), Some(boundary)) => LocationTable::from_csv_path(path, boundary)?,
        (Some(_), None) => return Err("--locations needs --city-boundary".into()),
        (None, _) => generated_table(args.grid_side, args.grid_spacing_miles)?,
    };
    info!(entries = table.len(), city = table.city_boundary(), "location table ready");
    Ok(table)
}

fn load_params(args: &Args) -> Result<SessionParams, Box<dyn Error>> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_str::<SessionParams>(&fs::read_to_string(path)?)?,
        None => SessionParams::default(),
    };
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }
    Ok(params)
}

fn build_world(args: &Args) -> Result<World, Box<dyn Error>> {
    let table = load_table(args)?;
    let params = load_params(args)?;
    let store: Box<dyn SettingsStore> = match &args.settings {
        Some(path) => Box::new(IniFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    let host = ScriptedHost::new(
        HostSettings {
            frame_secs: 1.0 / args.fps.max(1.0),
            collision_rate: args.collision_rate,
            rider_loss_rate: args.rider_loss_rate,
            ..HostSettings::default()
        },
        &table,
        params.seed.map(|seed| seed.wrapping_add(1)),
    );
    Ok(build_ride_world(host, Arc::new(table), store, params))
}

fn run(args: &Args) -> Result<SessionSummary, Box<dyn Error>> {
    let mut world = build_world(args)?;
    let mut schedule = ride_schedule::<ScriptedHost>();

    let mut ticks = 0;
    while ticks < args.max_ticks
        && world.resource::<RideTelemetry>().completed.len() < args.rides
    {
        world.resource_mut::<HostResource<ScriptedHost>>().step();
        run_tick::<ScriptedHost>(&mut world, &mut schedule);
        ticks += 1;
    }
    let completed = world.resource::<RideTelemetry>().completed.len();
    if completed < args.rides {
        warn!(completed, wanted = args.rides, ticks, "tick limit reached");
    }
    shutdown::<ScriptedHost>(&mut world);

    let host = world.resource::<HostResource<ScriptedHost>>();
    info!(
        frames = host.frames(),
        parked_cars_left = host.parked_cars(),
        "session finished"
    );
    let telemetry = world.resource::<RideTelemetry>().clone();
    Ok(SessionSummary {
        ticks,
        simulated_secs: world.resource::<TickClock>().elapsed_secs(),
        rides_completed: telemetry.completed.len(),
        average_rating: telemetry.average_rating(),
        paid_to_driver: host.paid,
        stats: *world.resource::<DriverStats>(),
        telemetry,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ride_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let summary = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
