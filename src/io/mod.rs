//! I/O layer.
//!
//! Capability traits the controller drives, plus the implementations that
//! ship with the crate.
//!
//! - [`MotionExecutor`], [`RangeScanner`], [`SingleBeamSensor`]: blocking
//!   platform capabilities
//! - [`RotationScanner`]: full scans from a single-beam sensor
//! - [`SimulatedRobot`]: map-backed simulator with drift and noise

mod rotation_scan;
mod simulation;
mod traits;

pub use rotation_scan::{RotationScanner, ScanAccumulator, accumulate_rotation_scan};
pub use simulation::{SimulatedRobot, SimulationConfig};
pub use traits::{MotionExecutor, RangeScanner, SingleBeamSensor};
