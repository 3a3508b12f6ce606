//! Floor-plan descriptions and their YAML form.
//!
//! A description is the raw input to [`OccupancyMap`](super::OccupancyMap):
//! a boundary polygon, axis-aligned obstacle rectangles, and named seats.
//!
//! ```yaml
//! boundary:
//!   - { x: 0.0, y: 0.0 }
//!   - { x: 20.0, y: 0.0 }
//!   - { x: 20.0, y: 15.0 }
//!   - { x: 0.0, y: 15.0 }
//! obstacles:
//!   - { x: 6.0, y: 4.0, width: 2.0, height: 5.0 }
//! seats:
//!   - { id: 1, x: 17.0, y: 12.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;
use crate::error::Result;

/// Axis-aligned rectangle given by its lower-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Named navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Seat {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    /// Seat location as a point.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Unvalidated floor plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapDescription {
    /// Outer wall polygon.
    pub boundary: Vec<Point2D>,
    /// Obstacle rectangles.
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    /// Named targets.
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl MapDescription {
    /// Rectangular room spanning `(0, 0)` to `(width, height)`.
    pub fn rectangular(width: f32, height: f32, obstacles: Vec<Rect>, seats: Vec<Seat>) -> Self {
        Self {
            boundary: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(width, 0.0),
                Point2D::new(width, height),
                Point2D::new(0.0, height),
            ],
            obstacles,
            seats,
        }
    }

    /// Load a description from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a description from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to a YAML string.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
