//! Static polygonal floor plan with ray casting.
//!
//! The map is immutable once built and is shared read-only between the
//! particle filter and the planners through `Arc<OccupancyMap>`.

use std::f32::consts::TAU;

use crate::core::types::{Point2D, Pose2D};
use crate::error::{NavError, Result};

use super::description::{MapDescription, Seat};
use super::polygon::{Bounds, Polygon};

/// Ray length used when no explicit range is given.
pub const DEFAULT_MAX_RANGE: f32 = 100.0;

/// Floor plan: one boundary polygon, obstacle polygons, and seats.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    boundary: Polygon,
    obstacles: Vec<Polygon>,
    seats: Vec<Seat>,
}

impl OccupancyMap {
    /// Create a map from already validated polygons.
    pub fn new(boundary: Polygon, obstacles: Vec<Polygon>) -> Self {
        Self {
            boundary,
            obstacles,
            seats: Vec::new(),
        }
    }

    /// Build and validate a map from its description.
    ///
    /// Rejects degenerate boundaries, obstacle rectangles without a positive
    /// finite size, non-finite seat coordinates, and duplicate seat ids.
    pub fn from_description(desc: &MapDescription) -> Result<Self> {
        let boundary = Polygon::new(desc.boundary.clone())
            .map_err(|e| NavError::InvalidMap(format!("boundary: {e}")))?;

        let obstacles = desc
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Polygon::rectangle(r.x, r.y, r.width, r.height)
                    .map_err(|e| NavError::InvalidMap(format!("obstacle {i}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut map = Self::new(boundary, obstacles);
        map.set_seats(desc.seats.clone())?;

        log::debug!(
            "Map built: {} obstacles, {} seats, extent {:.1} x {:.1}",
            map.obstacles.len(),
            map.seats.len(),
            map.bounds().width(),
            map.bounds().height()
        );
        Ok(map)
    }

    /// Replace the seat list.
    pub fn set_seats(&mut self, seats: Vec<Seat>) -> Result<()> {
        for (i, seat) in seats.iter().enumerate() {
            if !seat.position().is_finite() {
                return Err(NavError::InvalidMap(format!(
                    "seat {} has non-finite coordinates",
                    seat.id
                )));
            }
            if seats[..i].iter().any(|s| s.id == seat.id) {
                return Err(NavError::InvalidMap(format!("duplicate seat id {}", seat.id)));
            }
            if self.in_obstacle(seat.x, seat.y) {
                log::warn!("Seat {} at ({}, {}) is not in free space", seat.id, seat.x, seat.y);
            }
        }
        self.seats = seats;
        Ok(())
    }

    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Look up a seat by id.
    pub fn seat(&self, id: u32) -> Result<&Seat> {
        self.seats
            .iter()
            .find(|s| s.id == id)
            .ok_or(NavError::UnknownSeat(id))
    }

    /// Bounding box of the boundary polygon.
    pub fn bounds(&self) -> Bounds {
        self.boundary.bounds()
    }

    /// Cast a ray and return the distance to the first wall or obstacle edge.
    ///
    /// Returns `max_range` when nothing is hit within range. The result is
    /// always in `[0, max_range]`; a negative `max_range` is treated as 0.
    pub fn distance_to_nearest_obstacle(&self, x: f32, y: f32, heading: f32, max_range: f32) -> f32 {
        let max_range = max_range.max(0.0);
        let origin = Point2D::new(x, y);
        let direction = Point2D::from_angle(heading);

        std::iter::once(&self.boundary)
            .chain(self.obstacles.iter())
            .filter_map(|poly| poly.ray_hit(&origin, &direction))
            .fold(max_range, f32::min)
    }

    /// Full-revolution scan with [`DEFAULT_MAX_RANGE`].
    ///
    /// Beam `i` is cast at `heading + i * 2π / beam_count`.
    pub fn get_scan(&self, x: f32, y: f32, heading: f32, beam_count: usize) -> ScanRays<'_> {
        self.scan_with_range(x, y, heading, beam_count, DEFAULT_MAX_RANGE)
    }

    /// Full-revolution scan with an explicit ray length.
    pub fn scan_with_range(
        &self,
        x: f32,
        y: f32,
        heading: f32,
        beam_count: usize,
        max_range: f32,
    ) -> ScanRays<'_> {
        ScanRays {
            map: self,
            x,
            y,
            heading,
            beam_count,
            max_range,
            next: 0,
        }
    }

    /// Expected scan from a pose.
    pub fn scan_from(&self, pose: &Pose2D, beam_count: usize, max_range: f32) -> ScanRays<'_> {
        self.scan_with_range(pose.x, pose.y, pose.theta, beam_count, max_range)
    }

    /// Whether a point is blocked: inside (or on) an obstacle, or not
    /// strictly inside the boundary.
    pub fn in_obstacle(&self, x: f32, y: f32) -> bool {
        let p = Point2D::new(x, y);
        self.obstacles.iter().any(|o| o.contains_or_touches(&p)) || !self.boundary.contains(&p)
    }

    /// Lattice-point free test used by the grid planner.
    ///
    /// Boundary edges count as free; obstacle edges count as blocked.
    pub fn is_cell_free(&self, x: f32, y: f32) -> bool {
        let p = Point2D::new(x, y);
        self.boundary.contains_or_touches(&p) && !self.obstacles.iter().any(|o| o.contains_or_touches(&p))
    }
}

/// Lazy, restartable sequence of ray-cast distances.
///
/// Cloning yields an independent iterator from the same position.
#[derive(Debug, Clone)]
pub struct ScanRays<'a> {
    map: &'a OccupancyMap,
    x: f32,
    y: f32,
    heading: f32,
    beam_count: usize,
    max_range: f32,
    next: usize,
}

impl Iterator for ScanRays<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.next >= self.beam_count {
            return None;
        }
        let angle = self.heading + self.next as f32 * TAU / self.beam_count as f32;
        self.next += 1;
        Some(
            self.map
                .distance_to_nearest_obstacle(self.x, self.y, angle, self.max_range),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.beam_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScanRays<'_> {}
