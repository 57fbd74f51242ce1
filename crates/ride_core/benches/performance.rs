//! Performance benchmarks for ride_core using Criterion.rs.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ride_core::assignment::{LocationAssignmentEngine, ScanLimits};
use ride_core::config::RideConfig;
use ride_core::geo::GeoPoint;
use ride_core::runner::{ride_schedule, run_ticks};
use ride_core::session::{build_ride_world, SessionParams};
use ride_core::settings::RegionPolicy;
use ride_core::store::MemoryStore;
use ride_core::test_helpers::{grid_table, FakeHost, StraightLineOracle};

fn bench_assignment_search(c: &mut Criterion) {
    // (grid side, scan quota)
    let cases = vec![
        ("small", 15, 20),
        ("full_table", 33, 20),
        ("full_table_quota_100", 33, 100),
    ];

    let mut group = c.benchmark_group("assignment_search");
    for (name, side, quota) in cases {
        let table = Arc::new(grid_table(side, side * side / 2, 0.04));
        let limits = ScanLimits {
            quota,
            ..ScanLimits::from(&RideConfig::default())
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &table, |b, table| {
            b.iter(|| {
                let mut engine = LocationAssignmentEngine::new(table.clone(), limits);
                let mut rng = StdRng::seed_from_u64(42);
                while !engine.is_ready() {
                    engine.advance(
                        GeoPoint::default(),
                        &StraightLineOracle,
                        &mut rng,
                        RegionPolicy::Everywhere,
                    );
                }
                black_box(engine.commit())
            });
        });
    }
    group.finish();
}

fn bench_single_quota(c: &mut Criterion) {
    let table = Arc::new(grid_table(33, 544, 0.04));
    let limits = ScanLimits::from(&RideConfig::default());

    c.bench_function("assignment_single_quota", |b| {
        b.iter(|| {
            let mut engine = LocationAssignmentEngine::new(table.clone(), limits);
            let mut rng = StdRng::seed_from_u64(7);
            engine.advance(
                black_box(GeoPoint::default()),
                &StraightLineOracle,
                &mut rng,
                RegionPolicy::City,
            );
            black_box(engine.scan_cursor())
        });
    });
}

fn bench_ride_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ride_ticks");
    for ticks in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(ticks), &ticks, |b, &ticks| {
            b.iter(|| {
                let mut world = build_ride_world(
                    FakeHost::new().with_driver_in_car(GeoPoint::default()),
                    Arc::new(grid_table(33, 544, 0.04)),
                    Box::new(MemoryStore::default()),
                    SessionParams::default().with_seed(42),
                );
                let mut schedule = ride_schedule::<FakeHost>();
                black_box(run_ticks::<FakeHost>(&mut world, &mut schedule, ticks))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_assignment_search,
    bench_single_quota,
    bench_ride_ticks
);
criterion_main!(benches);
