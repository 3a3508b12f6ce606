//! Simulated robot over an [`OccupancyMap`].
//!
//! Drives instruction batches with configurable drift, answers scans by
//! ray casting from the true pose with range noise, and can play the part
//! of a single-beam sensor. The handle is cheap to clone; all clones share
//! one robot, so the same instance can be passed as executor and scanner.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::algorithms::mapping::{DEFAULT_MAX_RANGE, OccupancyMap};
use crate::algorithms::planning::MotionInstruction;
use crate::core::types::{Point2D, Pose2D, RangeScan};
use crate::error::{NavError, Result};
use crate::navigation::{SpeedMode, SpeedPercent, SpeedProfile};

use super::traits::{MotionExecutor, RangeScanner, SingleBeamSensor};

/// Bumper probe spacing along a move.
const BUMPER_STEP: f32 = 0.05;

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// True start pose of the robot.
    #[serde(default = "default_start")]
    pub start: Pose2D,

    /// Translation error (std dev per unit distance) at 50% speed.
    /// Scales linearly with speed.
    #[serde(default = "default_drift_xy")]
    pub drift_xy: f32,

    /// Heading error (std dev in radians per instruction) at 50% speed.
    #[serde(default = "default_drift_theta")]
    pub drift_theta: f32,

    /// Range noise standard deviation.
    #[serde(default = "default_range_noise")]
    pub range_noise: f32,

    /// Time a full scan takes.
    #[serde(default)]
    pub scan_latency_ms: u64,

    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// Random seed (0 for random).
    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub speed_profile: SpeedProfile,
}

fn default_start() -> Pose2D {
    Pose2D::new(1.0, 1.0, 0.0)
}
fn default_drift_xy() -> f32 {
    0.02
}
fn default_drift_theta() -> f32 {
    0.01
}
fn default_range_noise() -> f32 {
    0.02
}
fn default_max_range() -> f32 {
    DEFAULT_MAX_RANGE
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            drift_xy: default_drift_xy(),
            drift_theta: default_drift_theta(),
            range_noise: default_range_noise(),
            scan_latency_ms: 0,
            max_range: default_max_range(),
            seed: 0,
            speed_profile: SpeedProfile::default(),
        }
    }
}

impl SimulationConfig {
    /// Perfect motion and sensing.
    pub fn ideal(start: Pose2D) -> Self {
        Self {
            start,
            drift_xy: 0.0,
            drift_theta: 0.0,
            range_noise: 0.0,
            seed: 1,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("drift_xy", self.drift_xy),
            ("drift_theta", self.drift_theta),
            ("range_noise", self.range_noise),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(NavError::Config(format!("simulation.{name} must be >= 0, got {v}")));
            }
        }
        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(NavError::Config("simulation.max_range must be > 0".into()));
        }
        Ok(())
    }
}

/// Gaussian noise with deterministic seeding support.
#[derive(Debug)]
struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    #[inline]
    fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }
}

#[derive(Debug)]
struct SimState {
    map: Arc<OccupancyMap>,
    config: SimulationConfig,
    pose: Pose2D,
    noise: NoiseGenerator,
    trajectory: Vec<Pose2D>,
    last_speed: Option<SpeedPercent>,
    elapsed: Duration,
    bumps: usize,
}

impl SimState {
    fn drive(&mut self, inst: &MotionInstruction, speed: SpeedPercent) {
        let length = inst.length();
        if length <= 0.0 {
            return;
        }
        let scale = speed.fraction() * 2.0;
        let heading = inst.heading() + self.noise.gaussian(self.config.drift_theta * scale);
        let distance = (length * (1.0 + self.noise.gaussian(self.config.drift_xy * scale))).max(0.0);

        let start = self.pose.position();
        let dir = Point2D::from_angle(heading);
        let probes = (distance / BUMPER_STEP).ceil() as usize;
        let mut reached = start;
        for i in 1..=probes {
            let d = (i as f32 * BUMPER_STEP).min(distance);
            let p = start + dir * d;
            if self.map.in_obstacle(p.x, p.y) {
                self.bumps += 1;
                log::warn!(
                    "Simulated robot bumped at ({:.2}, {:.2}) after {:.2} of {:.2}",
                    p.x,
                    p.y,
                    d,
                    distance
                );
                break;
            }
            reached = p;
        }

        self.pose = Pose2D::new(reached.x, reached.y, heading);
        self.elapsed += Duration::from_secs_f32(distance / (speed.fraction() * 2.0).max(0.01));
        self.trajectory.push(self.pose);
    }

    fn range(&mut self, heading: f32) -> f32 {
        let max_range = self.config.max_range;
        let d = self
            .map
            .distance_to_nearest_obstacle(self.pose.x, self.pose.y, heading, max_range);
        (d + self.noise.gaussian(self.config.range_noise)).clamp(0.0, max_range)
    }
}

/// Shared handle to a simulated robot.
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    inner: Arc<Mutex<SimState>>,
}

impl SimulatedRobot {
    pub fn new(map: Arc<OccupancyMap>, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let start = config.start;
        let state = SimState {
            map,
            noise: NoiseGenerator::new(config.seed),
            config,
            pose: start,
            trajectory: vec![start],
            last_speed: None,
            elapsed: Duration::ZERO,
            bumps: 0,
        };
        Ok(Self {
            inner: Arc::new(Mutex::new(state)),
        })
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ground-truth pose.
    pub fn true_pose(&self) -> Pose2D {
        self.state().pose
    }

    /// Ground-truth poses after every executed instruction, start first.
    pub fn trajectory(&self) -> Vec<Pose2D> {
        self.state().trajectory.clone()
    }

    /// Speed used for the most recent batch.
    pub fn last_speed(&self) -> Option<SpeedPercent> {
        self.state().last_speed
    }

    /// Number of moves cut short by an obstacle.
    pub fn bumps(&self) -> usize {
        self.state().bumps
    }

    /// Simulated time spent driving and scanning.
    pub fn elapsed(&self) -> Duration {
        self.state().elapsed
    }

    /// Change how long a scan takes.
    pub fn set_scan_latency(&self, latency: Duration) {
        self.state().config.scan_latency_ms = latency.as_millis() as u64;
    }

    /// Teleport the robot.
    pub fn place(&self, pose: Pose2D) {
        let mut state = self.state();
        state.pose = pose;
        state.trajectory.push(pose);
    }
}

impl MotionExecutor for SimulatedRobot {
    fn execute(&mut self, batch: &[MotionInstruction], speed: SpeedMode) -> Result<()> {
        let mut state = self.state();
        let percent = state.config.speed_profile.resolve(speed);
        state.last_speed = Some(percent);
        for inst in batch {
            state.drive(inst, percent);
        }
        log::debug!(
            "Simulated batch of {} at {}: true pose ({:.2}, {:.2}, {:.2})",
            batch.len(),
            percent,
            state.pose.x,
            state.pose.y,
            state.pose.theta
        );
        Ok(())
    }
}

impl RangeScanner for SimulatedRobot {
    fn scan(&mut self, beam_count: usize, timeout: Duration) -> Result<RangeScan> {
        let mut state = self.state();
        let latency = Duration::from_millis(state.config.scan_latency_ms);
        if latency > timeout {
            state.elapsed += timeout;
            // Beams arrive evenly over the scan latency
            let collected = (beam_count as u128 * timeout.as_millis() / latency.as_millis().max(1)) as usize;
            return Err(NavError::SensorTimeout {
                timeout_ms: timeout.as_millis() as u64,
                collected: collected.min(beam_count),
                expected: beam_count,
            });
        }

        state.elapsed += latency;
        let start = state.pose.theta;
        let increment = std::f32::consts::TAU / beam_count.max(1) as f32;
        let ranges = (0..beam_count)
            .map(|i| state.range(start + i as f32 * increment))
            .collect();
        Ok(RangeScan::new(ranges))
    }
}

impl SingleBeamSensor for SimulatedRobot {
    fn rotate_by(&mut self, angle: f32) -> Result<()> {
        let mut state = self.state();
        let pose = state.pose;
        state.pose = Pose2D::new(pose.x, pose.y, pose.theta + angle);
        Ok(())
    }

    fn read_distance(&mut self) -> Result<f32> {
        let mut state = self.state();
        let heading = state.pose.theta;
        Ok(state.range(heading))
    }
}
