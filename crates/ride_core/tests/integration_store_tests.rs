mod support;

use std::fs;

use ride_core::geo::units_to_miles;
use ride_core::notice::Notice;
use ride_core::pricing::compute_payment;
use ride_core::runner::update_settings;
use ride_core::settings::{DriverSettings, DriverStats, RatingMode, RegionPolicy};
use ride_core::store::{IniFileStore, SettingsStore};
use ride_core::test_helpers::{FailingStore, FakeHost};
use support::flow::complete_ride;
use support::schedule::TickRunner;
use support::world::{host, trip, TestWorldBuilder};

fn store_failures(host: &FakeHost) -> usize {
    host.notices()
        .iter()
        .filter(|notice| matches!(notice, Notice::StoreFailure(_)))
        .count()
}

#[test]
fn settings_file_drives_the_fare_and_stats_are_written_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.ini");
    fs::write(
        &path,
        concat!(
            "; driver menu\n",
            "[SETTINGS]\nAverageRating=Enabled\nRoutes=Everywhere\nPayPerMile=80\n\n",
            "[STATS]\nAverageRating=4.0\nTotalJobs=4\nTotalEarnings=900\n"
        ),
    )
    .expect("write settings");

    let mut world = TestWorldBuilder::new()
        .with_store(Box::new(IniFileStore::new(&path)))
        .build();
    assert_eq!(
        world.resource::<DriverSettings>().region_policy,
        RegionPolicy::Everywhere
    );
    let mut runner = TickRunner::new();
    complete_ride(&mut runner, &mut world);

    let trip = trip(&world);
    let miles = units_to_miles(trip.pickup_marker.distance_to(&trip.dropoff_marker));
    let payment = compute_payment(miles, 80);

    let reloaded = IniFileStore::new(&path).load_stats().expect("stats");
    assert_eq!(reloaded.total_jobs, 5);
    assert_eq!(reloaded.total_earnings, 900 + payment);
    // (4.0 * 4 + 5.0) / 5
    assert!((reloaded.average_rating - 4.2).abs() < 1e-4);

    let text = fs::read_to_string(&path).expect("read back");
    assert!(text.starts_with("; driver menu\n[SETTINGS]\n"));
    assert!(text.contains("PayPerMile=80"));
    assert!(text.contains("TotalJobs=5"));
    assert_eq!(store_failures(host(&world)), 0);
}

#[test]
fn missing_file_starts_from_defaults_and_is_created_on_first_ride() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fresh.ini");

    let mut world = TestWorldBuilder::new()
        .with_store(Box::new(IniFileStore::new(&path)))
        .build();
    assert_eq!(*world.resource::<DriverStats>(), DriverStats::default());
    assert!(!path.exists());

    let mut runner = TickRunner::new();
    complete_ride(&mut runner, &mut world);

    let stats = IniFileStore::new(&path).load_stats().expect("stats");
    assert_eq!(stats.total_jobs, 1);
    assert_eq!(stats.average_rating, 5.0);
}

#[test]
fn malformed_file_falls_back_to_defaults_with_a_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.ini");
    fs::write(&path, "[SETTINGS]\nPayPerMile=lots\n[STATS]\nTotalJobs=2\n").expect("write");

    let world = TestWorldBuilder::new()
        .with_store(Box::new(IniFileStore::new(&path)))
        .build();

    assert_eq!(*world.resource::<DriverSettings>(), DriverSettings::default());
    assert_eq!(world.resource::<DriverStats>().total_jobs, 2);
    assert_eq!(store_failures(host(&world)), 1);
}

#[test]
fn failing_store_keeps_stats_in_memory() {
    let mut world = TestWorldBuilder::new()
        .with_store(Box::new(FailingStore))
        .build();
    assert_eq!(store_failures(host(&world)), 2);

    let mut runner = TickRunner::new();
    complete_ride(&mut runner, &mut world);

    let stats = world.resource::<DriverStats>();
    assert_eq!(stats.total_jobs, 1);
    assert!(stats.total_earnings > 0);
    assert_eq!(store_failures(host(&world)), 3);
    // the ride itself still paid out
    assert!(host(&world).paid_total() > 0);
}

#[test]
fn disabled_rating_reuses_the_average() {
    let settings = DriverSettings {
        rating_mode: RatingMode::Disabled,
        ..DriverSettings::default()
    };
    let stats = DriverStats {
        average_rating: 4.0,
        total_jobs: 10,
        total_earnings: 5_000,
    };
    let mut world = TestWorldBuilder::new().with_profile(settings, stats).build();
    let mut runner = TickRunner::new();
    complete_ride(&mut runner, &mut world);

    let summary_rating = host(&world)
        .notices()
        .into_iter()
        .find_map(|notice| match notice {
            Notice::RideSummary { rating, .. } => Some(rating),
            _ => None,
        })
        .expect("summary");
    assert_eq!(summary_rating, 4.0);
    assert_eq!(world.resource::<DriverStats>().average_rating, 4.0);
    assert_eq!(world.resource::<DriverStats>().total_jobs, 11);
}

#[test]
fn updated_settings_are_persisted_without_touching_stats() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.ini");
    fs::write(&path, "[STATS]\nAverageRating=4.5\nTotalJobs=2\nTotalEarnings=300\n")
        .expect("write");
    let mut world = TestWorldBuilder::new()
        .with_store(Box::new(IniFileStore::new(&path)))
        .build();

    let chosen = DriverSettings {
        rating_mode: RatingMode::Disabled,
        region_policy: RegionPolicy::CityToCountryside,
        pay_rate_per_mile: 65,
    };
    update_settings::<FakeHost>(&mut world, chosen);

    assert_eq!(*world.resource::<DriverSettings>(), chosen);
    let reloaded = IniFileStore::new(&path);
    assert_eq!(reloaded.load_settings().expect("settings"), chosen);
    assert_eq!(reloaded.load_stats().expect("stats").total_jobs, 2);
    let text = fs::read_to_string(&path).expect("read back");
    assert!(text.contains("Routes=City <-> Countryside"));
}

#[test]
fn failed_settings_save_still_applies_in_memory() {
    let mut world = TestWorldBuilder::new()
        .with_store(Box::new(FailingStore))
        .build();
    let chosen = DriverSettings {
        pay_rate_per_mile: 10,
        ..DriverSettings::default()
    };
    update_settings::<FakeHost>(&mut world, chosen);

    assert_eq!(world.resource::<DriverSettings>().pay_rate_per_mile, 10);
    assert_eq!(store_failures(host(&world)), 3);
}
