//! Grid graph planner with Dijkstra shortest paths.
//!
//! The map extent is discretized into integer lattice points. Every pair of
//! 8-adjacent free points is joined by an undirected edge:
//!
//! ```text
//!   √2  1  √2
//!    ╲  │  ╱
//!  1 ─ (x,y) ─ 1
//!    ╱  │  ╲
//!   √2  1  √2
//! ```
//!
//! The graph is built once per map and never changes afterwards.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::f32::consts::SQRT_2;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::algorithms::mapping::OccupancyMap;
use crate::core::types::Point2D;
use crate::error::{NavError, Result};

use super::route::{GridStep, PathPlanner, PlannedRoute};

const NEIGHBOR_OFFSETS: [(i32, i32, f32); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, SQRT_2),
    (-1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (-1, -1, SQRT_2),
];

/// Integer lattice coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Nearest lattice point to a world position.
    pub fn nearest(p: &Point2D) -> Self {
        Self::new(p.x.round() as i32, p.y.round() as i32)
    }

    /// World position of this lattice point.
    pub fn to_point(self) -> Point2D {
        Point2D::new(self.x as f32, self.y as f32)
    }
}

/// Static weighted graph over the free lattice points of a map.
#[derive(Debug, Clone)]
pub struct GridGraph {
    origin_x: i32,
    origin_y: i32,
    width: usize,
    height: usize,
    free: Vec<bool>,
    adjacency: Vec<Vec<(usize, f32)>>,
}

impl GridGraph {
    /// Build the graph over the map's bounding box.
    ///
    /// Lattice points run from `floor(min)` over `ceil(max - floor(min))`
    /// points per axis.
    pub fn new(map: &OccupancyMap) -> Result<Self> {
        let bounds = map.bounds();
        let origin_x = bounds.min.x.floor() as i32;
        let origin_y = bounds.min.y.floor() as i32;
        let width = (bounds.max.x - origin_x as f32).ceil() as usize;
        let height = (bounds.max.y - origin_y as f32).ceil() as usize;
        if width == 0 || height == 0 {
            return Err(NavError::InvalidMap(format!(
                "map extent {width} x {height} has no grid cells"
            )));
        }

        let mut graph = Self {
            origin_x,
            origin_y,
            width,
            height,
            free: Vec::with_capacity(width * height),
            adjacency: vec![Vec::new(); width * height],
        };

        for idx in 0..width * height {
            let p = graph.cell(idx).to_point();
            graph.free.push(map.is_cell_free(p.x, p.y));
        }

        for idx in 0..width * height {
            if !graph.free[idx] {
                continue;
            }
            let cell = graph.cell(idx);
            for (dx, dy, w) in NEIGHBOR_OFFSETS {
                if let Ok(n) = graph.index(GridCell::new(cell.x + dx, cell.y + dy))
                    && graph.free[n]
                {
                    graph.adjacency[idx].push((n, w));
                }
            }
        }

        log::debug!(
            "Grid graph: {}x{} cells, {} free, {} edges",
            width,
            height,
            graph.free.iter().filter(|&&f| f).count(),
            graph.adjacency.iter().map(Vec::len).sum::<usize>() / 2
        );
        Ok(graph)
    }

    /// Grid size as (width, height) in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.width * self.height
    }

    /// Linear index of a cell.
    pub fn index(&self, cell: GridCell) -> Result<usize> {
        let lx = cell.x - self.origin_x;
        let ly = cell.y - self.origin_y;
        if lx < 0 || ly < 0 || lx as usize >= self.width || ly as usize >= self.height {
            return Err(NavError::OutOfGrid {
                x: cell.x,
                y: cell.y,
            });
        }
        Ok(ly as usize * self.width + lx as usize)
    }

    /// Cell at a linear index. Inverse of [`index`](Self::index).
    pub fn cell(&self, index: usize) -> GridCell {
        GridCell::new(
            self.origin_x + (index % self.width) as i32,
            self.origin_y + (index / self.width) as i32,
        )
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_ok()
    }

    /// Whether a cell is in the grid and free.
    pub fn is_free(&self, cell: GridCell) -> bool {
        self.index(cell).is_ok_and(|i| self.free[i])
    }

    /// Neighbours of a node with edge weights.
    pub fn neighbors(&self, index: usize) -> &[(usize, f32)] {
        &self.adjacency[index]
    }

    /// Weight of the edge between two cells, if any.
    pub fn edge_weight(&self, a: GridCell, b: GridCell) -> Option<f32> {
        let ia = self.index(a).ok()?;
        let ib = self.index(b).ok()?;
        self.adjacency[ia]
            .iter()
            .find(|(n, _)| *n == ib)
            .map(|&(_, w)| w)
    }

    /// Shortest path between two cells, both inclusive, start first.
    pub fn path_from_to(&self, start: GridCell, goal: GridCell) -> Result<Vec<GridCell>> {
        let start_idx = self.index(start)?;
        let goal_idx = self.index(goal)?;
        if start_idx == goal_idx {
            return Ok(vec![start]);
        }

        let (dist, pred) = self.dijkstra(start_idx, Some(goal_idx));
        if !dist[goal_idx].is_finite() {
            return Err(NavError::NoPath {
                from_x: start.x as f32,
                from_y: start.y as f32,
                to_x: goal.x as f32,
                to_y: goal.y as f32,
            });
        }

        let mut path = vec![goal_idx];
        let mut v = goal_idx;
        while v != start_idx {
            v = pred[v].ok_or(NavError::DisconnectedGraph { node: v })?;
            path.push(v);
            if path.len() > self.node_count() {
                return Err(NavError::DisconnectedGraph { node: v });
            }
        }
        path.reverse();
        Ok(path.into_iter().map(|i| self.cell(i)).collect())
    }

    /// Single-source Dijkstra. Stops early once `target` is settled.
    fn dijkstra(&self, source: usize, target: Option<usize>) -> (Vec<f32>, Vec<Option<usize>>) {
        let n = self.node_count();
        let mut dist = vec![f32::INFINITY; n];
        let mut pred: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        dist[source] = 0.0;
        heap.push(QueueNode {
            index: source,
            cost: 0.0,
        });

        while let Some(QueueNode { index, cost }) = heap.pop() {
            if cost > dist[index] {
                continue;
            }
            if Some(index) == target {
                break;
            }
            for &(next, w) in &self.adjacency[index] {
                let candidate = cost + w;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    pred[next] = Some(index);
                    heap.push(QueueNode {
                        index: next,
                        cost: candidate,
                    });
                }
            }
        }
        (dist, pred)
    }

    /// Consecutive cell differences along a path.
    pub fn instructions_from_path(path: &[GridCell]) -> Vec<GridStep> {
        path.windows(2)
            .map(|w| GridStep {
                dx: w[1].x - w[0].x,
                dy: w[1].y - w[0].y,
            })
            .collect()
    }

    /// Find nearest free cell using BFS over 4-neighbours.
    pub fn nearest_free_cell(&self, start: GridCell, max_radius: i32) -> Option<GridCell> {
        let start_idx = self.index(start).ok()?;
        let mut visited = vec![false; self.node_count()];
        let mut queue = VecDeque::new();
        queue.push_back((start_idx, 0i32));
        visited[start_idx] = true;

        while let Some((idx, depth)) = queue.pop_front() {
            if depth > max_radius {
                break;
            }
            if self.free[idx] {
                return Some(self.cell(idx));
            }
            let cell = self.cell(idx);
            for (dx, dy) in [(0, 1), (1, 0), (0, -1), (-1, 0)] {
                if let Ok(n) = self.index(GridCell::new(cell.x + dx, cell.y + dy))
                    && !visited[n]
                {
                    visited[n] = true;
                    queue.push_back((n, depth + 1));
                }
            }
        }
        None
    }
}

/// Node in the Dijkstra priority queue.
#[derive(Clone, Copy)]
struct QueueNode {
    index: usize,
    cost: f32,
}

impl Eq for QueueNode {}

impl PartialEq for QueueNode {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.cost == other.cost
    }
}

impl Ord for QueueNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower cost = higher priority)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for QueueNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Configuration for [`GraphPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPlannerConfig {
    /// BFS radius (cells) when the start lands on a blocked cell.
    #[serde(default = "default_snap_radius")]
    pub start_snap_radius: i32,
}

fn default_snap_radius() -> i32 {
    20
}

impl Default for GridPlannerConfig {
    fn default() -> Self {
        Self {
            start_snap_radius: default_snap_radius(),
        }
    }
}

/// Discrete global planner over a [`GridGraph`].
#[derive(Debug, Clone)]
pub struct GraphPlanner {
    config: GridPlannerConfig,
    map: Arc<OccupancyMap>,
    graph: GridGraph,
}

impl GraphPlanner {
    pub fn new(map: Arc<OccupancyMap>, config: GridPlannerConfig) -> Result<Self> {
        let graph = GridGraph::new(&map)?;
        Ok(Self { config, map, graph })
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// Clamp a cell into the lattice.
    fn clamp_cell(&self, cell: GridCell) -> GridCell {
        let g = &self.graph;
        GridCell::new(
            cell.x.clamp(g.origin_x, g.origin_x + g.width as i32 - 1),
            cell.y.clamp(g.origin_y, g.origin_y + g.height as i32 - 1),
        )
    }
}

impl PathPlanner for GraphPlanner {
    /// Route via lattice points.
    ///
    /// A goal inside an obstacle or outside the boundary has no route. The
    /// goal is rounded to the nearest lattice point and clamped into the
    /// grid. The start is rounded the same way and snapped to the nearest
    /// free point if blocked. The returned route starts at the exact
    /// `start` and ends at the exact `goal`.
    fn plan(&mut self, start: Point2D, goal: Point2D) -> Result<PlannedRoute> {
        let no_path = || NavError::NoPath {
            from_x: start.x,
            from_y: start.y,
            to_x: goal.x,
            to_y: goal.y,
        };
        if self.map.in_obstacle(goal.x, goal.y) {
            return Err(no_path());
        }
        let goal_cell = self.clamp_cell(GridCell::nearest(&goal));

        let mut start_cell = self.clamp_cell(GridCell::nearest(&start));
        if !self.graph.is_free(start_cell) {
            start_cell = self
                .graph
                .nearest_free_cell(start_cell, self.config.start_snap_radius)
                .ok_or_else(no_path)?;
            log::debug!(
                "Start ({:.2}, {:.2}) blocked, snapped to cell ({}, {})",
                start.x,
                start.y,
                start_cell.x,
                start_cell.y
            );
        }

        let cells = self
            .graph
            .path_from_to(start_cell, goal_cell)
            .map_err(|e| match e {
                NavError::NoPath { .. } => no_path(),
                other => other,
            })?;

        let mut route = PlannedRoute::starting_at(start);
        route.extend_to(start_cell.to_point());
        for step in GridGraph::instructions_from_path(&cells) {
            route.push(step.into());
        }
        route.extend_to(goal);
        log::debug!(
            "Grid route: {} waypoints, cost {:.2}",
            route.waypoints.len(),
            route.cost
        );
        Ok(route)
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}
