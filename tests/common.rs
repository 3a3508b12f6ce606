//! Shared fixtures for MargaNav integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use marga_nav::{
    ControllerConfig, GraphPlanner, GridPlannerConfig, MapDescription, NavigationController,
    OccupancyMap, ParticleFilter, ParticleFilterConfig, PathPlanner, PerturbationConfig, Pose2D,
    Rect, RrtStarConfig, RrtStarPlanner, Seat, SimulatedRobot, SimulationConfig,
};

/// 20 x 15 room split by two offset walls into an S-shaped corridor.
pub fn s_room() -> MapDescription {
    MapDescription::rectangular(
        20.0,
        15.0,
        vec![Rect::new(6.0, 0.0, 1.0, 9.0), Rect::new(12.0, 6.0, 1.0, 9.0)],
        vec![Seat::new(1, 3.0, 12.0), Seat::new(2, 17.0, 2.0)],
    )
}

/// 20 x 15 room with a single wall hanging from the top.
pub fn single_wall_room() -> MapDescription {
    MapDescription::rectangular(20.0, 15.0, vec![Rect::new(9.0, 5.0, 1.0, 10.0)], vec![])
}

pub fn build_map(desc: &MapDescription) -> Arc<OccupancyMap> {
    Arc::new(OccupancyMap::from_description(desc).unwrap())
}

pub fn tracking_filter(map: Arc<OccupancyMap>, start: Pose2D, seed: u64) -> ParticleFilter {
    let config = ParticleFilterConfig {
        num_particles: 120,
        initial_spread_xy: 0.1,
        initial_spread_theta: 0.02,
        seed,
        perturbation: PerturbationConfig::gaussian(0.05, 0.02),
        ..Default::default()
    };
    ParticleFilter::new(config, map, start).unwrap()
}

pub fn grid_planner(map: Arc<OccupancyMap>) -> Box<dyn PathPlanner> {
    Box::new(GraphPlanner::new(map, GridPlannerConfig::default()).unwrap())
}

pub fn rrt_planner(map: Arc<OccupancyMap>, seed: u64) -> Box<dyn PathPlanner> {
    let config = RrtStarConfig {
        max_iterations: 1500,
        step_length: 1.5,
        search_radius: 4.0,
        goal_radius: 1.0,
        collision_step: 0.1,
        seed,
    };
    Box::new(RrtStarPlanner::new(map, config).unwrap())
}

pub fn controller_config() -> ControllerConfig {
    ControllerConfig {
        beam_count: 36,
        scan_timeout_ms: 1000,
        ..Default::default()
    }
}

/// Controller over an ideal simulated robot.
pub fn ideal_controller(
    map: Arc<OccupancyMap>,
    planner: Box<dyn PathPlanner>,
    start: Pose2D,
) -> (NavigationController<SimulatedRobot, SimulatedRobot>, SimulatedRobot) {
    let robot = SimulatedRobot::new(map.clone(), SimulationConfig::ideal(start)).unwrap();
    let filter = tracking_filter(map, start, 11);
    let nav = NavigationController::new(
        controller_config(),
        planner,
        filter,
        robot.clone(),
        robot.clone(),
        start,
    )
    .unwrap();
    (nav, robot)
}
