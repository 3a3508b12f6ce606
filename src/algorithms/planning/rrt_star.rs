//! RRT* sampling-based planner in continuous space.
//!
//! Each iteration samples a point in the map extent, steers from the nearest
//! tree node by at most `step_length`, attaches the new node to the cheapest
//! collision-free parent within `search_radius`, and rewires neighbours that
//! become cheaper through it. Rewiring updates the cost of the whole moved
//! subtree.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::algorithms::mapping::OccupancyMap;
use crate::core::types::Point2D;
use crate::error::{NavError, Result};

use super::route::{PathPlanner, PlannedRoute};

/// Configuration for [`RrtStarPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RrtStarConfig {
    /// Sampling iterations per plan.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Maximum edge length when steering toward a sample.
    #[serde(default = "default_step_length")]
    pub step_length: f32,
    /// Neighbourhood radius for parent choice and rewiring.
    #[serde(default = "default_search_radius")]
    pub search_radius: f32,
    /// Distance to the goal that counts as reached.
    #[serde(default = "default_goal_radius")]
    pub goal_radius: f32,
    /// Spacing of in_obstacle probes along an edge.
    #[serde(default = "default_collision_step")]
    pub collision_step: f32,
    /// Random seed (0 for random).
    #[serde(default)]
    pub seed: u64,
}

fn default_max_iterations() -> usize {
    2000
}

fn default_step_length() -> f32 {
    1.0
}

fn default_search_radius() -> f32 {
    3.0
}

fn default_goal_radius() -> f32 {
    0.75
}

fn default_collision_step() -> f32 {
    0.1
}

impl Default for RrtStarConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            step_length: default_step_length(),
            search_radius: default_search_radius(),
            goal_radius: default_goal_radius(),
            collision_step: default_collision_step(),
            seed: 0,
        }
    }
}

impl RrtStarConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(NavError::Config("rrt_star.max_iterations must be > 0".into()));
        }
        for (name, v) in [
            ("step_length", self.step_length),
            ("search_radius", self.search_radius),
            ("goal_radius", self.goal_radius),
            ("collision_step", self.collision_step),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(NavError::Config(format!("rrt_star.{name} must be > 0, got {v}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    point: Point2D,
    parent: Option<usize>,
    cost: f32,
    children: Vec<usize>,
}

/// Rooted search tree. Lives for a single planning call.
#[derive(Debug)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    fn new(root: Point2D) -> Self {
        Self {
            nodes: vec![TreeNode {
                point: root,
                parent: None,
                cost: 0.0,
                children: Vec::new(),
            }],
        }
    }

    fn nearest(&self, p: &Point2D) -> usize {
        let mut best = 0;
        let mut best_d = f32::INFINITY;
        for (i, n) in self.nodes.iter().enumerate() {
            let d = n.point.distance_squared(p);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    fn within(&self, p: &Point2D, radius: f32) -> Vec<usize> {
        let r2 = radius * radius;
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].point.distance_squared(p) <= r2)
            .collect()
    }

    fn insert(&mut self, point: Point2D, parent: usize, cost: f32) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(TreeNode {
            point,
            parent: Some(parent),
            cost,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Move `node` under `new_parent` and shift its subtree's costs.
    fn reparent(&mut self, node: usize, new_parent: usize, new_cost: f32) {
        if let Some(old) = self.nodes[node].parent {
            self.nodes[old].children.retain(|&c| c != node);
        }
        self.nodes[node].parent = Some(new_parent);
        self.nodes[new_parent].children.push(node);

        let delta = new_cost - self.nodes[node].cost;
        let mut stack = vec![node];
        while let Some(i) = stack.pop() {
            self.nodes[i].cost += delta;
            stack.extend(self.nodes[i].children.iter().copied());
        }
    }

    /// Points from the root to `node`.
    fn path_to(&self, node: usize) -> Vec<Point2D> {
        let mut path = vec![self.nodes[node].point];
        let mut current = self.nodes[node].parent;
        while let Some(i) = current {
            path.push(self.nodes[i].point);
            current = self.nodes[i].parent;
        }
        path.reverse();
        path
    }
}

/// Asymptotically optimal sampling planner.
#[derive(Debug)]
pub struct RrtStarPlanner {
    config: RrtStarConfig,
    map: Arc<OccupancyMap>,
    rng: StdRng,
}

impl RrtStarPlanner {
    pub fn new(map: Arc<OccupancyMap>, config: RrtStarConfig) -> Result<Self> {
        config.validate()?;
        let rng = if config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.seed)
        };
        Ok(Self { config, map, rng })
    }

    pub fn config(&self) -> &RrtStarConfig {
        &self.config
    }

    /// Whether the straight segment `a -> b` stays in free space.
    ///
    /// Probes every `collision_step` along the segment, including `b` but
    /// not `a`.
    fn segment_free(&self, a: &Point2D, b: &Point2D) -> bool {
        let length = a.distance(b);
        let steps = (length / self.config.collision_step).ceil().max(1.0) as usize;
        (1..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            let p = *a + (*b - *a) * t;
            !self.map.in_obstacle(p.x, p.y)
        })
    }

    fn sample(&mut self) -> Point2D {
        let bounds = self.map.bounds();
        Point2D::new(
            bounds.min.x + self.rng.random::<f32>() * bounds.width(),
            bounds.min.y + self.rng.random::<f32>() * bounds.height(),
        )
    }

    fn steer(&self, from: &Point2D, toward: &Point2D) -> Point2D {
        let d = from.distance(toward);
        if d <= self.config.step_length {
            *toward
        } else {
            *from + (*toward - *from) * (self.config.step_length / d)
        }
    }

    /// Grow the tree for the configured number of iterations.
    fn grow(&mut self, start: Point2D) -> Tree {
        let mut tree = Tree::new(start);

        for _ in 0..self.config.max_iterations {
            let sample = self.sample();
            let nearest = tree.nearest(&sample);
            let new_point = self.steer(&tree.nodes[nearest].point, &sample);
            if new_point.distance_squared(&tree.nodes[nearest].point) < 1e-12 {
                continue;
            }
            if !self.segment_free(&tree.nodes[nearest].point, &new_point) {
                continue;
            }

            let neighbors = tree.within(&new_point, self.config.search_radius);

            // Cheapest collision-free parent; nearest is already known free
            let mut candidates: Vec<(usize, f32)> = neighbors
                .iter()
                .map(|&i| (i, tree.nodes[i].cost + tree.nodes[i].point.distance(&new_point)))
                .collect();
            candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

            let mut parent = (
                nearest,
                tree.nodes[nearest].cost + tree.nodes[nearest].point.distance(&new_point),
            );
            for &(i, cost) in &candidates {
                if cost >= parent.1 {
                    break;
                }
                if self.segment_free(&tree.nodes[i].point, &new_point) {
                    parent = (i, cost);
                    break;
                }
            }

            let new_idx = tree.insert(new_point, parent.0, parent.1);

            for &i in &neighbors {
                if i == parent.0 {
                    continue;
                }
                let through_new = parent.1 + new_point.distance(&tree.nodes[i].point);
                if through_new < tree.nodes[i].cost
                    && self.segment_free(&new_point, &tree.nodes[i].point)
                {
                    tree.reparent(i, new_idx, through_new);
                }
            }
        }
        tree
    }
}

impl PathPlanner for RrtStarPlanner {
    /// Plan with a fresh tree rooted at `start`.
    ///
    /// A goal inside an obstacle or outside the boundary has no route.
    /// Among nodes within `goal_radius` of the goal, picks the one giving
    /// the cheapest complete route. The exact goal is appended when the last
    /// segment to it is collision-free.
    fn plan(&mut self, start: Point2D, goal: Point2D) -> Result<PlannedRoute> {
        if self.map.in_obstacle(goal.x, goal.y) {
            return Err(NavError::NoPath {
                from_x: start.x,
                from_y: start.y,
                to_x: goal.x,
                to_y: goal.y,
            });
        }
        let tree = self.grow(start);

        let r2 = self.config.goal_radius * self.config.goal_radius;
        let mut best: Option<(usize, f32, bool)> = None;
        for (i, node) in tree.nodes.iter().enumerate() {
            if node.point.distance_squared(&goal) > r2 {
                continue;
            }
            let reach_goal = self.segment_free(&node.point, &goal);
            let total = if reach_goal {
                node.cost + node.point.distance(&goal)
            } else {
                node.cost
            };
            if best.is_none_or(|(_, c, _)| total < c) {
                best = Some((i, total, reach_goal));
            }
        }

        let Some((node, cost, reach_goal)) = best else {
            log::debug!(
                "RRT*: {} nodes, none within {:.2} of goal",
                tree.nodes.len(),
                self.config.goal_radius
            );
            return Err(NavError::PlanningExhausted {
                iterations: self.config.max_iterations,
            });
        };

        let mut points = tree.path_to(node);
        if reach_goal {
            points.push(goal);
        }
        let route = PlannedRoute::from_waypoints(points);
        log::debug!(
            "RRT*: {} nodes, route of {} waypoints, cost {:.2}",
            tree.nodes.len(),
            route.waypoints.len(),
            cost
        );
        Ok(route)
    }

    fn name(&self) -> &'static str {
        "rrt_star"
    }
}
