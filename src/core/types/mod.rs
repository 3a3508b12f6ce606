//! Core data types.
//!
//! - [`Point2D`]: 2D point in map units
//! - [`Pose2D`]: Robot pose (x, y, theta)
//! - [`RangeScan`]: Full-revolution range scan, one distance per beam

mod pose;
mod scan;

pub use pose::{Point2D, Pose2D};
pub use scan::RangeScan;
