//! Ray-cast scan matching sensor model.
//!
//! Each particle predicts the scan it would see from its pose; the weight is
//! the inverse of the sum of squared range errors against the real scan.

use crate::algorithms::mapping::OccupancyMap;
use crate::core::types::{Pose2D, RangeScan};

/// Added to the squared error so a perfect match stays finite.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Inverse-SSE scan matcher.
#[derive(Debug, Clone, Copy)]
pub struct RayCastSensorModel {
    /// Ray length for predicted beams.
    pub max_range: f32,
}

impl RayCastSensorModel {
    pub fn new(max_range: f32) -> Self {
        Self { max_range }
    }

    /// Sum of squared errors between the real scan and the scan predicted
    /// from `pose`, using the real scan's beam count.
    pub fn squared_error(&self, scan: &RangeScan, pose: &Pose2D, map: &OccupancyMap) -> f64 {
        scan.squared_error(map.scan_from(pose, scan.len(), self.max_range))
    }

    /// Unnormalized importance weight. Zero for poses in blocked space.
    pub fn weight(&self, scan: &RangeScan, pose: &Pose2D, map: &OccupancyMap) -> f64 {
        if map.in_obstacle(pose.x, pose.y) {
            return 0.0;
        }
        1.0 / (self.squared_error(scan, pose, map) + WEIGHT_EPSILON)
    }
}
