//! Particle filter tracking against the simulated robot.

mod common;

use std::time::Duration;

use marga_nav::{
    MotionExecutor, MotionInstruction, OdometryDelta, ParticleFilter, ParticleFilterConfig,
    PerturbationConfig, Pose2D, RangeScanner, RotationScanner, SimulatedRobot, SimulationConfig,
    SpeedMode, batch_odometry,
};

/// Drive a rectangular loop in one-unit steps, five steps per batch.
fn loop_batches() -> Vec<Vec<MotionInstruction>> {
    let legs = [(1.0, 0.0, 10), (0.0, 1.0, 3), (-1.0, 0.0, 10), (0.0, -1.0, 3)];
    let steps: Vec<MotionInstruction> = legs
        .iter()
        .flat_map(|&(dx, dy, n)| std::iter::repeat_n(MotionInstruction::new(dx, dy), n))
        .collect();
    steps.chunks(5).map(|c| c.to_vec()).collect()
}

fn noisy_config(start: Pose2D) -> SimulationConfig {
    SimulationConfig {
        start,
        drift_xy: 0.03,
        drift_theta: 0.02,
        range_noise: 0.02,
        seed: 17,
        ..Default::default()
    }
}

fn filter_config(seed: u64) -> ParticleFilterConfig {
    ParticleFilterConfig {
        num_particles: 200,
        initial_spread_xy: 0.1,
        initial_spread_theta: 0.02,
        seed,
        perturbation: PerturbationConfig::gaussian(0.08, 0.03),
        ..Default::default()
    }
}

#[test]
fn test_tracking_bounds_drift() {
    env_logger::try_init().ok();
    let map = common::build_map(&common::single_wall_room());
    let start = Pose2D::new(2.0, 1.0, 0.0);
    let mut robot = SimulatedRobot::new(map.clone(), noisy_config(start)).unwrap();
    let mut filter = ParticleFilter::new(filter_config(4), map, start).unwrap();

    let mut estimate = start;
    let mut worst: f32 = 0.0;
    for batch in loop_batches() {
        robot.execute(&batch, SpeedMode::default()).unwrap();
        let scan = robot.scan(36, Duration::from_secs(1)).unwrap();
        let odometry = batch_odometry(&batch, estimate.theta);
        filter.update_step(&odometry, &scan, None).unwrap();
        estimate = filter.max_particle();

        let error = estimate.distance_to(&robot.true_pose().position());
        worst = worst.max(error);
    }

    assert!(worst < 0.6, "tracking error reached {worst}");
    assert_eq!(filter.state().iterations, loop_batches().len() as u64);
    assert!(!filter.state().uniform_fallback);
}

#[test]
fn test_rotation_scan_feeds_filter() {
    let map = common::build_map(&common::single_wall_room());
    let start = Pose2D::new(4.0, 3.0, 0.0);
    let mut robot = SimulatedRobot::new(map.clone(), SimulationConfig::ideal(start)).unwrap();
    let mut scanner = RotationScanner::new(robot.clone());
    let mut filter = ParticleFilter::new(filter_config(8), map, start).unwrap();

    let batch = vec![MotionInstruction::new(1.0, 0.0); 3];
    robot.execute(&batch, SpeedMode::default()).unwrap();
    let scan = scanner.scan(24, Duration::from_secs(1)).unwrap();
    assert_eq!(scan.len(), 24);

    filter
        .update_step(&batch_odometry(&batch, 0.0), &scan, None)
        .unwrap();
    let estimate = filter.max_particle();
    assert!(estimate.distance_to(&robot.true_pose().position()) < 0.3);
}

#[test]
fn test_global_reinitialize_then_resize() {
    let map = common::build_map(&common::s_room());
    let truth = Pose2D::new(3.0, 12.0, 0.0);
    let robot = SimulatedRobot::new(map.clone(), SimulationConfig::ideal(truth)).unwrap();
    let mut scanner = robot.clone();
    let mut filter = ParticleFilter::new(filter_config(12), map.clone(), truth).unwrap();

    filter.global_reinitialize().unwrap();
    assert!(filter
        .particles()
        .iter()
        .all(|p| map.is_cell_free(p.pose.x, p.pose.y)));

    let scan = scanner.scan(36, Duration::from_secs(1)).unwrap();
    filter
        .update_step(&OdometryDelta::zero(), &scan, Some(500))
        .unwrap();
    assert_eq!(filter.num_particles(), 500);

    let total: f64 = filter.particles().iter().map(|p| p.weight).sum();
    approx::assert_relative_eq!(total, 1.0, epsilon = 1e-9);
}
