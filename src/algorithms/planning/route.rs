//! Planned routes and the planner interface.

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;
use crate::error::Result;

/// One relative move in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionInstruction {
    pub dx: f32,
    pub dy: f32,
}

impl MotionInstruction {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Length of the move.
    #[inline]
    pub fn length(&self) -> f32 {
        self.dx.hypot(self.dy)
    }

    /// Direction of travel in radians.
    #[inline]
    pub fn heading(&self) -> f32 {
        self.dy.atan2(self.dx)
    }
}

/// Integer lattice step between adjacent grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridStep {
    pub dx: i32,
    pub dy: i32,
}

impl From<GridStep> for MotionInstruction {
    fn from(step: GridStep) -> Self {
        MotionInstruction::new(step.dx as f32, step.dy as f32)
    }
}

/// Path from start to goal with the matching motion instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    /// Waypoints in world coordinates, start first.
    pub waypoints: Vec<Point2D>,
    /// Consecutive waypoint differences.
    pub instructions: Vec<MotionInstruction>,
    /// Total path length.
    pub cost: f32,
}

impl PlannedRoute {
    /// Route holding only its start point.
    pub fn starting_at(start: Point2D) -> Self {
        Self {
            waypoints: vec![start],
            instructions: Vec::new(),
            cost: 0.0,
        }
    }

    /// Build a route from waypoints.
    ///
    /// Consecutive duplicate waypoints are merged so no zero-length
    /// instruction is produced.
    pub fn from_waypoints(points: impl IntoIterator<Item = Point2D>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self {
                waypoints: Vec::new(),
                instructions: Vec::new(),
                cost: 0.0,
            };
        };
        let mut route = Self::starting_at(first);
        for p in points {
            route.extend_to(p);
        }
        route
    }

    /// Append a move ending exactly at `point`.
    pub fn extend_to(&mut self, point: Point2D) {
        let Some(last) = self.end() else {
            self.waypoints.push(point);
            return;
        };
        if last.distance_squared(&point) < 1e-12 {
            return;
        }
        self.record(MotionInstruction::new(point.x - last.x, point.y - last.y), point);
    }

    /// Append a relative move from the current end.
    pub fn push(&mut self, instruction: MotionInstruction) {
        let Some(last) = self.end() else {
            return;
        };
        if instruction.length() < 1e-6 {
            return;
        }
        let point = Point2D::new(last.x + instruction.dx, last.y + instruction.dy);
        self.record(instruction, point);
    }

    fn record(&mut self, instruction: MotionInstruction, point: Point2D) {
        self.cost += instruction.length();
        self.instructions.push(instruction);
        self.waypoints.push(point);
    }

    /// Whether the route needs no motion.
    pub fn is_trivial(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Final waypoint.
    pub fn end(&self) -> Option<Point2D> {
        self.waypoints.last().copied()
    }
}

/// Strategy that turns a start and goal into a route.
pub trait PathPlanner {
    /// Plan a route from `start` to `goal` in world coordinates.
    fn plan(&mut self, start: Point2D, goal: Point2D) -> Result<PlannedRoute>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}
