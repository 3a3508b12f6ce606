//! Odometry estimate for an executed instruction batch.

use crate::algorithms::localization::OdometryDelta;
use crate::algorithms::planning::MotionInstruction;
use crate::core::math::angle_diff;

/// Odometry delta after executing `batch` from a pose with `current_heading`.
///
/// Translation is the sum of the batch displacements. The robot turns to
/// face each instruction before driving it, so it ends up facing the last
/// instruction's direction; the heading delta is that direction minus the
/// current heading, normalized to [-π, π]. Zero-length instructions do not
/// turn the robot.
pub fn batch_odometry(batch: &[MotionInstruction], current_heading: f32) -> OdometryDelta {
    let dx = batch.iter().map(|i| i.dx).sum();
    let dy = batch.iter().map(|i| i.dy).sum();
    let dtheta = batch
        .iter()
        .rev()
        .find(|i| i.length() > 0.0)
        .map_or(0.0, |last| angle_diff(current_heading, last.heading()));
    OdometryDelta::new(dx, dy, dtheta)
}
