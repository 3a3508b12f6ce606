//! Particle filter (Monte Carlo Localization) over a polygonal map.
//!
//! Every [`ParticleFilter::update_step`] runs the same four sub-steps:
//!
//! ```text
//! motion update ──► perturbation ──► measurement ──► resample
//!  (same delta)     (uniform or      (1 / (SSE+ε),    (weighted, with
//!                    gaussian)        normalized)      replacement)
//! ```
//!
//! The new generation is built on the side and swapped in at the end, so a
//! failed update leaves the previous generation untouched.

use std::f32::consts::PI;
use std::sync::Arc;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::algorithms::mapping::{DEFAULT_MAX_RANGE, OccupancyMap};
use crate::core::types::{Pose2D, RangeScan};
use crate::error::{NavError, Result};

use super::motion_model::OdometryDelta;
use super::perturbation::PerturbationConfig;
use super::sensor_model::RayCastSensorModel;

/// Rejection-sampling budget per particle for global reinitialization.
const MAX_SAMPLE_ATTEMPTS: usize = 1000;

/// A single particle representing a possible robot pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Hypothesized robot pose.
    pub pose: Pose2D,
    /// Importance weight.
    pub weight: f64,
}

impl Particle {
    pub fn with_weight(pose: Pose2D, weight: f64) -> Self {
        Self { pose, weight }
    }
}

/// Configuration for the particle filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleFilterConfig {
    /// Initial population size.
    #[serde(default = "default_num_particles")]
    pub num_particles: usize,

    /// Standard deviation of the initial spread around the start pose.
    #[serde(default = "default_spread_xy")]
    pub initial_spread_xy: f32,
    #[serde(default = "default_spread_theta")]
    pub initial_spread_theta: f32,

    /// Ray length for predicted scans.
    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// Random seed for deterministic behavior (0 for random).
    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub perturbation: PerturbationConfig,
}

fn default_num_particles() -> usize {
    100
}

fn default_spread_xy() -> f32 {
    0.5
}

fn default_spread_theta() -> f32 {
    0.1
}

fn default_max_range() -> f32 {
    DEFAULT_MAX_RANGE
}

impl Default for ParticleFilterConfig {
    fn default() -> Self {
        Self {
            num_particles: default_num_particles(),
            initial_spread_xy: default_spread_xy(),
            initial_spread_theta: default_spread_theta(),
            max_range: default_max_range(),
            seed: 0,
            perturbation: PerturbationConfig::default(),
        }
    }
}

impl ParticleFilterConfig {
    /// Small spread around a well-known start pose.
    pub fn tracking() -> Self {
        Self {
            num_particles: 200,
            initial_spread_xy: 0.2,
            initial_spread_theta: 0.05,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(NavError::InvalidParticleCount(0));
        }
        if !(self.initial_spread_xy >= 0.0 && self.initial_spread_theta >= 0.0) {
            return Err(NavError::Config("initial spread must be >= 0".into()));
        }
        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(NavError::Config(format!(
                "max_range must be positive, got {}",
                self.max_range
            )));
        }
        self.perturbation.validate()
    }
}

/// State of the particle filter for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParticleFilterState {
    /// Total number of update steps.
    pub iterations: u64,
    /// Highest normalized weight after the last measurement update.
    pub max_weight: f64,
    /// Particles zeroed for sitting in blocked space.
    pub excluded: usize,
    /// Whether the last update fell back to uniform weights.
    pub uniform_fallback: bool,
}

/// Monte Carlo Localization particle filter.
#[derive(Debug)]
pub struct ParticleFilter {
    config: ParticleFilterConfig,
    map: Arc<OccupancyMap>,
    particles: Vec<Particle>,
    sensor_model: RayCastSensorModel,
    rng: StdRng,
    state: ParticleFilterState,
}

impl ParticleFilter {
    /// Create a new particle filter initialized around the given pose.
    pub fn new(config: ParticleFilterConfig, map: Arc<OccupancyMap>, initial_pose: Pose2D) -> Result<Self> {
        config.validate()?;

        let mut rng = if config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.seed)
        };
        let particles = Self::initialize_particles(
            config.num_particles,
            &initial_pose,
            config.initial_spread_xy,
            config.initial_spread_theta,
            &mut rng,
        );

        Ok(Self {
            sensor_model: RayCastSensorModel::new(config.max_range),
            config,
            map,
            particles,
            rng,
            state: ParticleFilterState::default(),
        })
    }

    /// Initialize particles with Gaussian distribution around a pose.
    fn initialize_particles(
        num_particles: usize,
        center: &Pose2D,
        spread_xy: f32,
        spread_theta: f32,
        rng: &mut StdRng,
    ) -> Vec<Particle> {
        let weight = 1.0 / num_particles as f64;
        (0..num_particles)
            .map(|_| {
                let nx: f32 = rng.sample(StandardNormal);
                let ny: f32 = rng.sample(StandardNormal);
                let nt: f32 = rng.sample(StandardNormal);
                let pose = Pose2D::new(
                    center.x + nx * spread_xy,
                    center.y + ny * spread_xy,
                    center.theta + nt * spread_theta,
                );
                Particle::with_weight(pose, weight)
            })
            .collect()
    }

    pub fn config(&self) -> &ParticleFilterConfig {
        &self.config
    }

    /// Shared map handle.
    pub fn map(&self) -> &Arc<OccupancyMap> {
        &self.map
    }

    /// Get current particles (for visualization).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Get current filter state (for diagnostics).
    pub fn state(&self) -> &ParticleFilterState {
        &self.state
    }

    /// Current population size.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Pose of the highest-weight particle. Ties go to the earliest one.
    pub fn max_particle(&self) -> Pose2D {
        let mut best = &self.particles[0];
        for p in &self.particles[1..] {
            if p.weight > best.weight {
                best = p;
            }
        }
        best.pose
    }

    /// Run one full motion, perturbation, measurement, resample cycle.
    ///
    /// `next_count` resizes the population; `None` keeps the current size.
    /// On error the current generation is left as it was.
    pub fn update_step(
        &mut self,
        odometry: &OdometryDelta,
        scan: &RangeScan,
        next_count: Option<usize>,
    ) -> Result<()> {
        let next_count = next_count.unwrap_or(self.particles.len());
        if next_count == 0 {
            return Err(NavError::InvalidParticleCount(next_count));
        }

        let mut generation: Vec<Particle> = self
            .particles
            .iter()
            .map(|p| Particle::with_weight(odometry.apply(&p.pose), p.weight))
            .collect();

        let perturbation = self.config.perturbation;
        for p in &mut generation {
            p.pose = perturbation.apply(&p.pose, &mut self.rng);
        }

        self.measure(&mut generation, scan);
        let generation = self.resample(&generation, next_count);

        self.particles = generation;
        self.state.iterations += 1;

        log::debug!(
            "PF update #{}: n={}, max_w={:.4}, excluded={}, fallback={}",
            self.state.iterations,
            self.particles.len(),
            self.state.max_weight,
            self.state.excluded,
            self.state.uniform_fallback
        );
        Ok(())
    }

    /// Weight particles against the scan and normalize.
    ///
    /// Particles in blocked space get zero weight before normalization. If
    /// every weight is zero the generation falls back to uniform weights.
    fn measure(&mut self, generation: &mut [Particle], scan: &RangeScan) {
        let mut excluded = 0;
        for p in generation.iter_mut() {
            p.weight = self.sensor_model.weight(scan, &p.pose, &self.map);
            if p.weight == 0.0 {
                excluded += 1;
            }
        }

        let fallback = normalize_weights(generation);
        if fallback {
            log::warn!(
                "All {} particles have zero weight, using uniform weights",
                generation.len()
            );
        }

        self.state.excluded = excluded;
        self.state.uniform_fallback = fallback;
        self.state.max_weight = generation.iter().map(|p| p.weight).fold(0.0, f64::max);
    }

    /// Draw `count` particles with replacement, proportional to weight.
    ///
    /// Children carry their parent's weight and are re-normalized.
    fn resample(&mut self, generation: &[Particle], count: usize) -> Vec<Particle> {
        let mut next: Vec<Particle> = match WeightedIndex::<f64>::new(generation.iter().map(|p| p.weight)) {
            Ok(dist) => (0..count).map(|_| generation[dist.sample(&mut self.rng)]).collect(),
            Err(e) => {
                log::warn!("Weighted resampling unavailable ({e}), sampling uniformly");
                (0..count)
                    .map(|_| generation[self.rng.random_range(0..generation.len())])
                    .collect()
            }
        };
        normalize_weights(&mut next);
        next
    }

    /// Reset the filter to a Gaussian cloud around a new pose.
    pub fn reset(&mut self, pose: Pose2D) {
        self.particles = Self::initialize_particles(
            self.config.num_particles,
            &pose,
            self.config.initial_spread_xy,
            self.config.initial_spread_theta,
            &mut self.rng,
        );
        self.state = ParticleFilterState::default();
    }

    /// Globally reinitialize particles (for kidnapped robot problem).
    ///
    /// Spreads the configured number of particles uniformly over free space
    /// in the map extent with uniform headings.
    pub fn global_reinitialize(&mut self) -> Result<()> {
        let n = self.config.num_particles;
        let bounds = self.map.bounds();
        let mut particles = Vec::with_capacity(n);
        let weight = 1.0 / n as f64;

        let mut attempts = 0;
        while particles.len() < n {
            if attempts >= n * MAX_SAMPLE_ATTEMPTS {
                return Err(NavError::InvalidMap("map has no free space to sample".into()));
            }
            attempts += 1;

            let x = bounds.min.x + self.rng.random::<f32>() * bounds.width();
            let y = bounds.min.y + self.rng.random::<f32>() * bounds.height();
            if self.map.in_obstacle(x, y) {
                continue;
            }
            let theta = self.rng.random_range(-PI..PI);
            particles.push(Particle::with_weight(Pose2D::new(x, y, theta), weight));
        }

        log::info!("Particle filter globally reinitialized with {} particles", n);
        self.particles = particles;
        self.state = ParticleFilterState::default();
        Ok(())
    }
}

/// Normalize weights to sum to 1. Returns true if the uniform fallback was
/// used because the total was zero.
fn normalize_weights(particles: &mut [Particle]) -> bool {
    let total: f64 = particles.iter().map(|p| p.weight).sum();
    if total > 0.0 && total.is_finite() {
        for p in particles.iter_mut() {
            p.weight /= total;
        }
        false
    } else {
        let uniform = 1.0 / particles.len() as f64;
        for p in particles.iter_mut() {
            p.weight = uniform;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::localization::NoisePolicy;
    use crate::algorithms::mapping::{MapDescription, Rect};
    use approx::assert_relative_eq;

    fn create_test_map() -> Arc<OccupancyMap> {
        let desc = MapDescription::rectangular(
            10.0,
            8.0,
            vec![Rect::new(6.0, 2.0, 1.0, 3.0)],
            vec![],
        );
        Arc::new(OccupancyMap::from_description(&desc).unwrap())
    }

    fn quiet_config(num_particles: usize) -> ParticleFilterConfig {
        ParticleFilterConfig {
            num_particles,
            initial_spread_xy: 0.3,
            initial_spread_theta: 0.05,
            seed: 42,
            perturbation: PerturbationConfig::none(),
            ..Default::default()
        }
    }

    fn scan_at(map: &OccupancyMap, pose: &Pose2D, beams: usize) -> RangeScan {
        RangeScan::new(map.scan_from(pose, beams, DEFAULT_MAX_RANGE).collect())
    }

    #[test]
    fn test_particle_filter_creation() {
        let filter = ParticleFilter::new(quiet_config(50), create_test_map(), Pose2D::new(2.0, 2.0, 0.0)).unwrap();
        assert_eq!(filter.num_particles(), 50);
        let total: f64 = filter.particles().iter().map(|p| p.weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_particles_rejected() {
        let result = ParticleFilter::new(quiet_config(0), create_test_map(), Pose2D::default());
        assert!(matches!(result, Err(NavError::InvalidParticleCount(0))));
    }

    #[test]
    fn test_resample_resizes() {
        let map = create_test_map();
        let truth = Pose2D::new(3.0, 4.0, 0.0);
        let mut filter = ParticleFilter::new(quiet_config(40), map.clone(), truth).unwrap();
        let scan = scan_at(&map, &truth, 12);

        filter.update_step(&OdometryDelta::zero(), &scan, Some(75)).unwrap();
        assert_eq!(filter.num_particles(), 75);

        filter.update_step(&OdometryDelta::zero(), &scan, None).unwrap();
        assert_eq!(filter.num_particles(), 75);

        filter.update_step(&OdometryDelta::zero(), &scan, Some(10)).unwrap();
        assert_eq!(filter.num_particles(), 10);
    }

    #[test]
    fn test_zero_next_count_leaves_generation() {
        let map = create_test_map();
        let truth = Pose2D::new(3.0, 4.0, 0.0);
        let mut filter = ParticleFilter::new(quiet_config(20), map.clone(), truth).unwrap();
        let before = filter.particles().to_vec();

        let err = filter
            .update_step(&OdometryDelta::new(1.0, 0.0, 0.0), &scan_at(&map, &truth, 8), Some(0))
            .unwrap_err();
        assert!(matches!(err, NavError::InvalidParticleCount(0)));
        assert_eq!(filter.particles(), &before[..]);
        assert_eq!(filter.state().iterations, 0);
    }

    #[test]
    fn test_weights_normalized_after_update() {
        let map = create_test_map();
        let truth = Pose2D::new(2.0, 6.0, 0.5);
        let mut filter = ParticleFilter::new(quiet_config(60), map.clone(), truth).unwrap();
        filter.update_step(&OdometryDelta::zero(), &scan_at(&map, &truth, 16), None).unwrap();

        let total: f64 = filter.particles().iter().map(|p| p.weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        assert!(!filter.state().uniform_fallback);
    }

    #[test]
    fn test_motion_update_shifts_every_particle() {
        let map = create_test_map();
        let start = Pose2D::new(2.0, 2.0, 0.0);
        let mut filter = ParticleFilter::new(quiet_config(1), map.clone(), start).unwrap();
        let before = filter.particles()[0].pose;

        let moved = Pose2D::new(before.x + 1.5, before.y + 1.0, before.theta);
        let scan = scan_at(&map, &moved, 8);
        filter.update_step(&OdometryDelta::new(1.5, 1.0, 0.0), &scan, None).unwrap();

        let after = filter.particles()[0].pose;
        assert_relative_eq!(after.x, before.x + 1.5, epsilon = 1e-5);
        assert_relative_eq!(after.y, before.y + 1.0, epsilon = 1e-5);
        assert_relative_eq!(filter.particles()[0].weight, 1.0);
    }

    #[test]
    fn test_all_excluded_falls_back_to_uniform() {
        let map = create_test_map();
        // Cloud centered inside the obstacle with no spread
        let config = ParticleFilterConfig {
            initial_spread_xy: 0.0,
            initial_spread_theta: 0.0,
            ..quiet_config(8)
        };
        let mut filter = ParticleFilter::new(config, map, Pose2D::new(6.5, 3.0, 0.0)).unwrap();
        filter
            .update_step(&OdometryDelta::zero(), &RangeScan::new(vec![1.0; 4]), None)
            .unwrap();

        assert!(filter.state().uniform_fallback);
        assert_eq!(filter.state().excluded, 8);
        for p in filter.particles() {
            assert_relative_eq!(p.weight, 1.0 / 8.0);
        }
    }

    #[test]
    fn test_blocked_particles_never_survive() {
        let map = create_test_map();
        // Wide cloud straddling the obstacle
        let config = ParticleFilterConfig {
            initial_spread_xy: 1.0,
            ..quiet_config(300)
        };
        let truth = Pose2D::new(5.0, 3.5, 0.0);
        let mut filter = ParticleFilter::new(config, map.clone(), truth).unwrap();
        filter.update_step(&OdometryDelta::zero(), &scan_at(&map, &truth, 12), None).unwrap();

        assert!(filter.state().excluded > 0);
        for p in filter.particles() {
            assert!(!map.in_obstacle(p.pose.x, p.pose.y));
        }
    }

    #[test]
    fn test_converges_to_true_pose() {
        let map = create_test_map();
        let truth = Pose2D::new(3.0, 5.0, 0.2);
        let config = ParticleFilterConfig {
            num_particles: 300,
            initial_spread_xy: 0.6,
            initial_spread_theta: 0.1,
            seed: 7,
            perturbation: PerturbationConfig {
                policy: NoisePolicy::Gaussian,
                x: 0.05,
                y: 0.05,
                theta: 0.02,
            },
            ..Default::default()
        };
        let start = Pose2D::new(3.4, 4.7, 0.2);
        let mut filter = ParticleFilter::new(config, map.clone(), start).unwrap();
        let scan = scan_at(&map, &truth, 24);

        for _ in 0..5 {
            filter.update_step(&OdometryDelta::zero(), &scan, None).unwrap();
        }
        let estimate = filter.max_particle();
        assert!(
            estimate.distance_to(&truth.position()) < 0.3,
            "estimate {:?} too far from {:?}",
            estimate,
            truth
        );
    }

    #[test]
    fn test_max_particle_prefers_first_on_tie() {
        let map = create_test_map();
        let mut filter = ParticleFilter::new(quiet_config(3), map, Pose2D::default()).unwrap();
        filter.particles = vec![
            Particle::with_weight(Pose2D::new(1.0, 1.0, 0.0), 0.4),
            Particle::with_weight(Pose2D::new(2.0, 2.0, 0.0), 0.4),
            Particle::with_weight(Pose2D::new(3.0, 3.0, 0.0), 0.2),
        ];
        assert_eq!(filter.max_particle(), Pose2D::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_global_reinitialize_in_free_space() {
        let map = create_test_map();
        let mut filter = ParticleFilter::new(quiet_config(200), map.clone(), Pose2D::default()).unwrap();
        filter.global_reinitialize().unwrap();

        assert_eq!(filter.num_particles(), 200);
        for p in filter.particles() {
            assert!(!map.in_obstacle(p.pose.x, p.pose.y));
        }
    }

    #[test]
    fn test_reset() {
        let map = create_test_map();
        let mut filter = ParticleFilter::new(quiet_config(100), map, Pose2D::default()).unwrap();
        let new_pose = Pose2D::new(8.0, 6.0, 1.0);
        filter.reset(new_pose);

        let mean_x = filter.particles().iter().map(|p| p.pose.x).sum::<f32>() / 100.0;
        let mean_y = filter.particles().iter().map(|p| p.pose.y).sum::<f32>() / 100.0;
        assert!((mean_x - new_pose.x).abs() < 0.2);
        assert!((mean_y - new_pose.y).abs() < 0.2);
        assert_eq!(filter.state().iterations, 0);
    }
}
