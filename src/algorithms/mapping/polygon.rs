//! Closed polygons for floor plans and obstacles.

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;
use crate::error::{NavError, Result};

/// Tolerance for boundary (on-edge) checks.
const EDGE_EPSILON: f32 = 1e-5;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point2D,
    pub max: Point2D,
}

impl Bounds {
    /// Width along X.
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height along Y.
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Whether a point lies within the box (closed).
    #[inline]
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Ordered, implicitly closed sequence of vertices.
///
/// The last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2D>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    ///
    /// Fails with [`NavError::InvalidMap`] for fewer than three vertices,
    /// non-finite coordinates, or zero area.
    pub fn new(vertices: Vec<Point2D>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(NavError::InvalidMap(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if let Some(p) = vertices.iter().find(|p| !p.is_finite()) {
            return Err(NavError::InvalidMap(format!(
                "polygon vertex ({}, {}) is not finite",
                p.x, p.y
            )));
        }
        let polygon = Self { vertices };
        if polygon.area() <= f32::EPSILON {
            return Err(NavError::InvalidMap("polygon has zero area".into()));
        }
        Ok(polygon)
    }

    /// Axis-aligned rectangle with its lower-left corner at `(x, y)`.
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(NavError::InvalidMap(format!(
                "rectangle at ({x}, {y}) has invalid size {width} x {height}"
            )));
        }
        Self::new(vec![
            Point2D::new(x, y),
            Point2D::new(x + width, y),
            Point2D::new(x + width, y + height),
            Point2D::new(x, y + height),
        ])
    }

    /// Vertices in order.
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Unsigned area (shoelace formula).
    pub fn area(&self) -> f32 {
        let twice: f32 = self.edges().map(|(a, b)| a.cross(&b)).sum();
        twice.abs() * 0.5
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Bounds {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for p in &self.vertices[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Bounds { min, max }
    }

    /// Strict interior test (even-odd rule).
    ///
    /// Points on an edge are reported as outside.
    pub fn contains(&self, p: &Point2D) -> bool {
        if self.on_boundary(p) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Closed containment: interior or on an edge.
    pub fn contains_or_touches(&self, p: &Point2D) -> bool {
        self.on_boundary(p) || self.contains(p)
    }

    /// Whether the point lies on any edge.
    pub fn on_boundary(&self, p: &Point2D) -> bool {
        self.edges()
            .any(|(a, b)| distance_to_segment(p, &a, &b) <= EDGE_EPSILON)
    }

    /// Smallest positive distance at which a ray hits any edge.
    ///
    /// `direction` must be a unit vector.
    pub fn ray_hit(&self, origin: &Point2D, direction: &Point2D) -> Option<f32> {
        self.edges()
            .filter_map(|(a, b)| ray_segment_intersection(origin, direction, &a, &b))
            .min_by(f32::total_cmp)
    }
}

/// Intersect a ray with a segment.
///
/// Solves `origin + t*dir = a + s*(b - a)` with cross products. Returns `t`
/// when `t > 0` and `s` lies in `[0, 1]`. Parallel segments never hit.
pub fn ray_segment_intersection(
    origin: &Point2D,
    direction: &Point2D,
    a: &Point2D,
    b: &Point2D,
) -> Option<f32> {
    let seg = *b - *a;
    let denom = direction.cross(&seg);
    if denom.abs() < f32::EPSILON {
        return None;
    }

    let to_start = *a - *origin;
    let t = to_start.cross(&seg) / denom;
    let s = to_start.cross(direction) / denom;

    if t > 0.0 && (0.0..=1.0).contains(&s) {
        Some(t)
    } else {
        None
    }
}

fn distance_to_segment(p: &Point2D, a: &Point2D, b: &Point2D) -> f32 {
    let seg = *b - *a;
    let len_sq = seg.dot(&seg);
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((*p - *a).dot(&seg) / len_sq).clamp(0.0, 1.0);
    p.distance(&(*a + seg * t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon {
        Polygon::rectangle(0.0, 0.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_contains_interior() {
        let square = unit_square();
        assert!(square.contains(&Point2D::new(0.5, 0.5)));
        assert!(!square.contains(&Point2D::new(1.5, 0.5)));
    }

    #[test]
    fn test_edge_points() {
        let square = unit_square();
        let on_edge = Point2D::new(1.0, 0.5);
        assert!(!square.contains(&on_edge));
        assert!(square.contains_or_touches(&on_edge));
        assert!(square.contains_or_touches(&Point2D::new(0.0, 0.0)));
    }

    #[test]
    fn test_concave_polygon() {
        // L shape: notch cut out of the top right
        let l = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.0, 2.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(2.0, 4.0),
            Point2D::new(0.0, 4.0),
        ])
        .unwrap();
        assert!(l.contains(&Point2D::new(1.0, 3.0)));
        assert!(!l.contains(&Point2D::new(3.0, 3.0)));
        assert_relative_eq!(l.area(), 12.0);
    }

    #[test]
    fn test_invalid_polygons() {
        assert!(Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]).is_err());
        let collinear = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
        ];
        assert!(Polygon::new(collinear).is_err());
        assert!(Polygon::rectangle(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Polygon::rectangle(0.0, 0.0, 1.0, f32::NAN).is_err());
    }

    #[test]
    fn test_ray_hit() {
        let square = Polygon::rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        let hit = square.ray_hit(&Point2D::new(5.0, 5.0), &Point2D::new(1.0, 0.0));
        assert_relative_eq!(hit.unwrap(), 5.0);

        let miss = square.ray_hit(&Point2D::new(20.0, 5.0), &Point2D::new(1.0, 0.0));
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_segment_parallel() {
        let t = ray_segment_intersection(
            &Point2D::new(0.0, 0.0),
            &Point2D::new(1.0, 0.0),
            &Point2D::new(0.0, 1.0),
            &Point2D::new(5.0, 1.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_bounds() {
        let b = Polygon::rectangle(1.0, 2.0, 3.0, 4.0).unwrap().bounds();
        assert_relative_eq!(b.width(), 3.0);
        assert_relative_eq!(b.height(), 4.0);
        assert_eq!(b.min, Point2D::new(1.0, 2.0));
    }
}
