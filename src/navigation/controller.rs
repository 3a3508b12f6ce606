//! Closed-loop goto controller.
//!
//! One `goto` repeats a strictly sequential cycle until the pose estimate
//! is within tolerance of the target:
//!
//! ```text
//!  ┌──────► plan from estimate ──► take first N instructions
//!  │                                        │
//!  │                                        ▼
//! adopt max_particle ◄── fuse odometry ◄── scan ◄── execute batch
//! ```
//!
//! Failures abort the call. The pose is only ever replaced by a fully
//! fused estimate, so an aborted call leaves the last good estimate.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::algorithms::localization::{OdometryDelta, Particle, ParticleFilter};
use crate::algorithms::mapping::OccupancyMap;
use crate::algorithms::planning::{MotionInstruction, PathPlanner, PlannedRoute};
use crate::core::types::{Point2D, Pose2D, RangeScan};
use crate::error::{NavError, Result};
use crate::io::{MotionExecutor, RangeScanner};

use super::odometry::batch_odometry;
use super::overlay::ScanOverlay;
use super::speed::SpeedMode;
use super::state::{CancelToken, NavState};

/// Controller parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Instructions executed between two localization steps.
    #[serde(default = "default_batch_size")]
    pub instruction_batch_size: usize,

    /// Distance to the target that counts as arrived.
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f32,

    /// Beams per scan.
    #[serde(default = "default_beam_count")]
    pub beam_count: usize,

    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,

    /// Batch budget per `goto` call.
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    /// Extra zero-motion filter updates with the same scan.
    #[serde(default)]
    pub refinement_steps: usize,

    #[serde(default)]
    pub speed: SpeedMode,
}

fn default_batch_size() -> usize {
    5
}
fn default_goal_tolerance() -> f32 {
    1.0
}
fn default_beam_count() -> usize {
    36
}
fn default_scan_timeout_ms() -> u64 {
    10_000
}
fn default_max_batches() -> usize {
    100
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            instruction_batch_size: default_batch_size(),
            goal_tolerance: default_goal_tolerance(),
            beam_count: default_beam_count(),
            scan_timeout_ms: default_scan_timeout_ms(),
            max_batches: default_max_batches(),
            refinement_steps: 0,
            speed: SpeedMode::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.instruction_batch_size == 0 {
            return Err(NavError::Config("controller.instruction_batch_size must be > 0".into()));
        }
        if self.beam_count == 0 {
            return Err(NavError::Config("controller.beam_count must be > 0".into()));
        }
        if !(self.goal_tolerance.is_finite() && self.goal_tolerance > 0.0) {
            return Err(NavError::Config(format!(
                "controller.goal_tolerance must be > 0, got {}",
                self.goal_tolerance
            )));
        }
        if self.max_batches == 0 {
            return Err(NavError::Config("controller.max_batches must be > 0".into()));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}

/// Outcome of a successful `goto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GotoReport {
    /// Batches executed.
    pub batches: usize,
    /// Instructions executed over all batches.
    pub instructions_executed: usize,
    /// Pose estimate on arrival.
    pub final_pose: Pose2D,
    /// Estimated distance left to the target.
    pub remaining_distance: f32,
}

/// Plans, drives, senses and relocalizes until the target is reached.
pub struct NavigationController<E, S> {
    config: ControllerConfig,
    map: Arc<OccupancyMap>,
    planner: Box<dyn PathPlanner>,
    filter: ParticleFilter,
    executor: E,
    scanner: S,
    pose: Pose2D,
    state: NavState,
    cancel: CancelToken,
    last_route: Option<PlannedRoute>,
    overlay: Option<ScanOverlay>,
}

impl<E: MotionExecutor, S: RangeScanner> NavigationController<E, S> {
    /// Create a controller starting from `initial_pose`.
    ///
    /// The map is taken from the filter so planner and filter agree on it.
    pub fn new(
        config: ControllerConfig,
        planner: Box<dyn PathPlanner>,
        filter: ParticleFilter,
        executor: E,
        scanner: S,
        initial_pose: Pose2D,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            map: Arc::clone(filter.map()),
            config,
            planner,
            filter,
            executor,
            scanner,
            pose: initial_pose,
            state: NavState::Idle,
            cancel: CancelToken::new(),
            last_route: None,
            overlay: None,
        })
    }

    /// Share an externally owned cancel token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current pose estimate.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Token that cancels the running `goto` at the next batch boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn map(&self) -> &Arc<OccupancyMap> {
        &self.map
    }

    pub fn filter(&self) -> &ParticleFilter {
        &self.filter
    }

    /// Current particle generation.
    pub fn particles(&self) -> &[Particle] {
        self.filter.particles()
    }

    /// Last fused scan projected from the pose it was fused into.
    pub fn scan_overlay(&self) -> Option<&ScanOverlay> {
        self.overlay.as_ref()
    }

    /// Route planned for the most recent batch.
    pub fn last_route(&self) -> Option<&PlannedRoute> {
        self.last_route.as_ref()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Plan from the current estimate without moving.
    pub fn plan_path(&mut self, goal: Point2D) -> Result<PlannedRoute> {
        self.planner.plan(self.pose.position(), goal)
    }

    /// Replace the estimate and redistribute the particles around it.
    pub fn relocalize(&mut self, pose: Pose2D) {
        self.filter.reset(pose);
        self.pose = pose;
        self.overlay = None;
    }

    /// Drive to a named seat.
    pub fn goto_seat(&mut self, id: u32) -> Result<GotoReport> {
        let target = self.map.seat(id)?.position();
        log::info!("Goto seat {} at ({:.2}, {:.2})", id, target.x, target.y);
        self.goto(target)
    }

    /// Drive to `target`, relocalizing after every batch.
    pub fn goto(&mut self, target: Point2D) -> Result<GotoReport> {
        let result = self.run_goto(target);
        self.state = match &result {
            Ok(_) => NavState::Reached,
            Err(NavError::Cancelled { .. }) => NavState::Cancelled,
            Err(_) => NavState::Failed,
        };
        if let Err(e) = &result {
            log::warn!("Goto ({:.2}, {:.2}) failed [{}]: {}", target.x, target.y, e.code(), e);
        }
        result
    }

    fn run_goto(&mut self, target: Point2D) -> Result<GotoReport> {
        let mut batches = 0;
        let mut instructions_executed = 0;

        loop {
            let remaining = self.pose.distance_to(&target);
            if remaining <= self.config.goal_tolerance {
                log::info!(
                    "Reached ({:.2}, {:.2}) after {} batches, estimate ({:.2}, {:.2})",
                    target.x,
                    target.y,
                    batches,
                    self.pose.x,
                    self.pose.y
                );
                return Ok(GotoReport {
                    batches,
                    instructions_executed,
                    final_pose: self.pose,
                    remaining_distance: remaining,
                });
            }
            if self.cancel.is_cancelled() {
                return Err(NavError::Cancelled { batches });
            }
            if batches >= self.config.max_batches {
                return Err(NavError::TooManyBatches {
                    count: batches,
                    max: self.config.max_batches,
                });
            }

            self.state = NavState::Planning;
            let route = self.planner.plan(self.pose.position(), target)?;
            let batch: Vec<MotionInstruction> = route
                .instructions
                .iter()
                .take(self.config.instruction_batch_size)
                .copied()
                .collect();
            log::debug!(
                "[{}] route cost {:.2} with {} instructions, executing {}",
                self.planner.name(),
                route.cost,
                route.instructions.len(),
                batch.len()
            );
            self.last_route = Some(route);

            self.state = NavState::Executing;
            self.executor.execute(&batch, self.config.speed)?;
            batches += 1;
            instructions_executed += batch.len();

            self.state = NavState::Sensing;
            let scan = self
                .scanner
                .scan(self.config.beam_count, self.config.scan_timeout())?;

            self.state = NavState::Localizing;
            let odometry = batch_odometry(&batch, self.pose.theta);
            self.fuse(&odometry, &scan)?;
        }
    }

    /// Fuse one batch into the filter and adopt the new estimate.
    fn fuse(&mut self, odometry: &OdometryDelta, scan: &RangeScan) -> Result<()> {
        self.filter.update_step(odometry, scan, None)?;
        for _ in 0..self.config.refinement_steps {
            self.filter.update_step(&OdometryDelta::zero(), scan, None)?;
        }

        self.pose = self.filter.max_particle();
        self.overlay = Some(ScanOverlay::new(self.pose, scan));
        log::debug!(
            "Fused odometry ({:.2}, {:.2}, {:.2}) -> estimate ({:.2}, {:.2}, {:.2})",
            odometry.dx,
            odometry.dy,
            odometry.dtheta,
            self.pose.x,
            self.pose.y,
            self.pose.theta
        );
        Ok(())
    }
}
