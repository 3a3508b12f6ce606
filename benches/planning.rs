//! Benchmark planning and localization hot paths.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;

use marga_nav::{
    GraphPlanner, GridPlannerConfig, MapDescription, OccupancyMap, OdometryDelta, ParticleFilter,
    ParticleFilterConfig, PathPlanner, Point2D, Pose2D, RangeScan, Rect, RrtStarConfig,
    RrtStarPlanner,
};

/// Office-like floor plan with a few desks.
fn office_map() -> Arc<OccupancyMap> {
    let desc = MapDescription::rectangular(
        40.0,
        30.0,
        vec![
            Rect::new(8.0, 0.0, 1.0, 20.0),
            Rect::new(18.0, 10.0, 1.0, 20.0),
            Rect::new(26.0, 5.0, 6.0, 3.0),
            Rect::new(26.0, 18.0, 6.0, 3.0),
        ],
        vec![],
    );
    Arc::new(OccupancyMap::from_description(&desc).unwrap())
}

fn bench_ray_cast(c: &mut Criterion) {
    let map = office_map();
    let mut group = c.benchmark_group("ray_cast_scan");

    for beams in [36usize, 90, 360].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(beams), beams, |b, &beams| {
            b.iter(|| {
                let scan: Vec<f32> = map.get_scan(black_box(4.0), black_box(25.0), 0.3, beams).collect();
                black_box(scan)
            })
        });
    }

    group.finish();
}

fn bench_grid_planner(c: &mut Criterion) {
    let map = office_map();
    let mut planner = GraphPlanner::new(map, GridPlannerConfig::default()).unwrap();

    c.bench_function("grid_plan_office", |b| {
        b.iter(|| {
            let route = planner.plan(black_box(Point2D::new(2.0, 2.0)), Point2D::new(37.0, 25.0));
            black_box(route)
        })
    });
}

fn bench_rrt_star(c: &mut Criterion) {
    let map = office_map();
    let config = RrtStarConfig {
        max_iterations: 1000,
        step_length: 2.0,
        search_radius: 5.0,
        seed: 42,
        ..Default::default()
    };
    let mut planner = RrtStarPlanner::new(map, config).unwrap();

    let mut group = c.benchmark_group("rrt_star");
    group.sample_size(10);
    group.bench_function("office_1000_iterations", |b| {
        b.iter(|| {
            let route = planner.plan(black_box(Point2D::new(2.0, 2.0)), Point2D::new(37.0, 25.0));
            black_box(route)
        })
    });
    group.finish();
}

fn bench_filter_update(c: &mut Criterion) {
    let map = office_map();
    let truth = Pose2D::new(4.0, 25.0, 0.3);
    let scan = RangeScan::new(map.scan_from(&truth, 36, 100.0).collect());

    let mut group = c.benchmark_group("particle_filter_update");
    for particles in [100usize, 500].iter() {
        let config = ParticleFilterConfig {
            num_particles: *particles,
            seed: 1,
            ..Default::default()
        };
        let mut filter = ParticleFilter::new(config, map.clone(), truth).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(particles), particles, |b, _| {
            b.iter(|| {
                let result = filter.update_step(&OdometryDelta::zero(), black_box(&scan), None);
                black_box(result)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ray_cast,
    bench_grid_planner,
    bench_rrt_star,
    bench_filter_update
);
criterion_main!(benches);
