//! Capability interfaces to the robot platform.
//!
//! The controller only needs three narrow, blocking capabilities. Drivers
//! for real hardware and the [`SimulatedRobot`](super::SimulatedRobot)
//! implement them.

use std::time::Duration;

use crate::algorithms::planning::MotionInstruction;
use crate::core::types::RangeScan;
use crate::error::Result;
use crate::navigation::SpeedMode;

/// Drives instruction batches.
pub trait MotionExecutor {
    /// Execute every instruction in order. Blocks until done or failed.
    fn execute(&mut self, batch: &[MotionInstruction], speed: SpeedMode) -> Result<()>;
}

/// Full-revolution range scanner.
pub trait RangeScanner {
    /// Take one scan of `beam_count` evenly spaced beams starting at the
    /// robot's heading.
    ///
    /// Blocks until the scan is complete. Fails with
    /// [`NavError::SensorTimeout`](crate::NavError::SensorTimeout) if it is
    /// not complete within `timeout`; partial scans are never returned.
    fn scan(&mut self, beam_count: usize, timeout: Duration) -> Result<RangeScan>;
}

/// Single forward-facing distance sensor on a robot that can turn in place.
pub trait SingleBeamSensor {
    /// Rotate in place by `angle` radians (counter-clockwise positive).
    fn rotate_by(&mut self, angle: f32) -> Result<()>;

    /// Read the distance straight ahead.
    fn read_distance(&mut self) -> Result<f32>;
}

impl<T: MotionExecutor + ?Sized> MotionExecutor for &mut T {
    fn execute(&mut self, batch: &[MotionInstruction], speed: SpeedMode) -> Result<()> {
        (**self).execute(batch, speed)
    }
}

impl<T: RangeScanner + ?Sized> RangeScanner for &mut T {
    fn scan(&mut self, beam_count: usize, timeout: Duration) -> Result<RangeScan> {
        (**self).scan(beam_count, timeout)
    }
}

impl<T: SingleBeamSensor + ?Sized> SingleBeamSensor for &mut T {
    fn rotate_by(&mut self, angle: f32) -> Result<()> {
        (**self).rotate_by(angle)
    }

    fn read_distance(&mut self) -> Result<f32> {
        (**self).read_distance()
    }
}
