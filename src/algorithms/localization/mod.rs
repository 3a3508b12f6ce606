//! Localization module.
//!
//! Monte Carlo Localization against a known polygonal map.
//!
//! # Components
//!
//! - [`ParticleFilter`]: Motion, perturbation, measurement and resample cycle
//! - [`OdometryDelta`]: World-frame displacement applied to every particle
//! - [`PerturbationConfig`]: Uniform or Gaussian particle diffusion
//! - [`RayCastSensorModel`]: Inverse-SSE scan matching

mod motion_model;
mod particle_filter;
mod perturbation;
mod sensor_model;

pub use motion_model::OdometryDelta;
pub use particle_filter::{Particle, ParticleFilter, ParticleFilterConfig, ParticleFilterState};
pub use perturbation::{NoisePolicy, PerturbationConfig};
pub use sensor_model::{RayCastSensorModel, WEIGHT_EPSILON};
