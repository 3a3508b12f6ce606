//! Navigation algorithms layer.
//!
//! # Contents
//!
//! - [`mapping`]: Polygonal floor plan with ray casting
//! - [`localization`]: Particle filter localization (Monte Carlo Localization)
//! - [`planning`]: Grid graph Dijkstra and RRT* planners

pub mod localization;
pub mod mapping;
pub mod planning;
