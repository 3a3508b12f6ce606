//! Debug overlay of the last fused scan.

use serde::{Deserialize, Serialize};

use crate::core::types::{Point2D, Pose2D, RangeScan};

/// Scan projected into world coordinates from the fused pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOverlay {
    /// Pose the scan was projected from.
    pub pose: Pose2D,
    /// Raw ranges, one per beam.
    pub ranges: Vec<f32>,
    /// Beam end points in world coordinates.
    pub hit_points: Vec<Point2D>,
}

impl ScanOverlay {
    pub fn new(pose: Pose2D, scan: &RangeScan) -> Self {
        let increment = scan.angle_increment();
        let hit_points = scan
            .ranges
            .iter()
            .enumerate()
            .map(|(i, &r)| pose.transform_point(&(Point2D::from_angle(i as f32 * increment) * r)))
            .collect();
        Self {
            pose,
            ranges: scan.ranges.clone(),
            hit_points,
        }
    }
}
