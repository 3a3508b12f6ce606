//! Particle perturbation (diffusion) after the motion update.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::core::types::Pose2D;
use crate::error::{NavError, Result};

/// Noise distribution applied to every particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoisePolicy {
    /// Uniform in `[-range, range]`.
    #[default]
    Uniform,
    /// Zero-mean Gaussian with the given standard deviation.
    Gaussian,
}

/// Perturbation magnitudes per pose component.
///
/// For [`NoisePolicy::Uniform`] each value is the half-width of the range,
/// for [`NoisePolicy::Gaussian`] it is the standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerturbationConfig {
    #[serde(default)]
    pub policy: NoisePolicy,
    #[serde(default = "default_xy")]
    pub x: f32,
    #[serde(default = "default_xy")]
    pub y: f32,
    #[serde(default = "default_theta")]
    pub theta: f32,
}

fn default_xy() -> f32 {
    0.1
}

fn default_theta() -> f32 {
    0.1
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            policy: NoisePolicy::Uniform,
            x: default_xy(),
            y: default_xy(),
            theta: default_theta(),
        }
    }
}

impl PerturbationConfig {
    /// No noise at all.
    pub fn none() -> Self {
        Self {
            policy: NoisePolicy::Uniform,
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Gaussian noise with the given deviations.
    pub fn gaussian(sigma_xy: f32, sigma_theta: f32) -> Self {
        Self {
            policy: NoisePolicy::Gaussian,
            x: sigma_xy,
            y: sigma_xy,
            theta: sigma_theta,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("x", self.x), ("y", self.y), ("theta", self.theta)] {
            if !v.is_finite() || v < 0.0 {
                return Err(NavError::Config(format!(
                    "perturbation.{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Draw one noise sample for a component.
    fn sample<R: Rng>(&self, magnitude: f32, rng: &mut R) -> f32 {
        if magnitude <= 0.0 {
            return 0.0;
        }
        match self.policy {
            NoisePolicy::Uniform => rng.random_range(-magnitude..=magnitude),
            NoisePolicy::Gaussian => {
                let n: f32 = rng.sample(StandardNormal);
                n * magnitude
            }
        }
    }

    /// Perturb one pose. Heading wraps through [`Pose2D::new`].
    pub fn apply<R: Rng>(&self, pose: &Pose2D, rng: &mut R) -> Pose2D {
        let dtheta = self.sample(self.theta, rng);
        let dx = self.sample(self.x, rng);
        let dy = self.sample(self.y, rng);
        pose.shifted(dx, dy, dtheta)
    }
}
