//! Core foundation layer.
//!
//! Bottom layer with no internal dependencies.
//!
//! # Contents
//!
//! - [`types`]: Core data types (points, poses, range scans)
//! - [`math`]: Angle normalization and wrapping

pub mod math;
pub mod types;
