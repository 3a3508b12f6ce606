//! Deterministic odometry motion update.
//!
//! The displacement is expressed in the world frame and applied as-is to
//! every particle; noise comes from the separate perturbation step.

use serde::{Deserialize, Serialize};

use crate::core::types::Pose2D;

/// World-frame displacement and heading change since the last update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OdometryDelta {
    pub dx: f32,
    pub dy: f32,
    pub dtheta: f32,
}

impl OdometryDelta {
    pub fn new(dx: f32, dy: f32, dtheta: f32) -> Self {
        Self { dx, dy, dtheta }
    }

    /// No motion. Used for refinement updates.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Apply to a pose without noise.
    #[inline]
    pub fn apply(&self, pose: &Pose2D) -> Pose2D {
        pose.shifted(self.dx, self.dy, self.dtheta)
    }
}
