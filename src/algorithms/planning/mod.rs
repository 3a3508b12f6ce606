//! Path planning algorithms.
//!
//! Two interchangeable strategies behind the [`PathPlanner`] trait:
//!
//! - [`GraphPlanner`]: Dijkstra over an 8-connected lattice graph
//! - [`RrtStarPlanner`]: RRT* in continuous space
//!
//! Both produce a [`PlannedRoute`] from the exact start to the goal.

mod grid_graph;
mod route;
mod rrt_star;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::algorithms::mapping::OccupancyMap;
use crate::error::Result;

pub use grid_graph::{GraphPlanner, GridCell, GridGraph, GridPlannerConfig};
pub use route::{GridStep, MotionInstruction, PathPlanner, PlannedRoute};
pub use rrt_star::{RrtStarConfig, RrtStarPlanner};

/// Planner selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    #[default]
    Grid,
    RrtStar,
}

/// Build the selected planner over a shared map.
pub fn build_planner(
    kind: PlannerKind,
    map: Arc<OccupancyMap>,
    grid: GridPlannerConfig,
    rrt_star: RrtStarConfig,
) -> Result<Box<dyn PathPlanner>> {
    Ok(match kind {
        PlannerKind::Grid => Box::new(GraphPlanner::new(map, grid)?),
        PlannerKind::RrtStar => Box::new(RrtStarPlanner::new(map, rrt_star)?),
    })
}
