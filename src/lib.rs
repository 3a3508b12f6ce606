//! MargaNav - Map-based navigation for small indoor robots
//!
//! Drives a robot to a target inside a known polygonal floor plan. Motion
//! runs open-loop in short instruction batches; after every batch a range
//! scan is fused into a particle filter and the route is replanned from the
//! new estimate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    main.rs                          │  ← CLI
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Capabilities
//! │      (executor/scanner traits, rotation scan,       │
//! │                  simulation)                        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  navigation/                        │  ← Orchestration
//! │         (controller, odometry, speed, state)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │        (mapping, localization, planning)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use marga_nav::{
//!     ControllerConfig, GraphPlanner, GridPlannerConfig, MapDescription, NavigationController,
//!     OccupancyMap, ParticleFilter, ParticleFilterConfig, Point2D, Pose2D, SimulatedRobot,
//!     SimulationConfig,
//! };
//!
//! let map = Arc::new(OccupancyMap::from_description(&MapDescription::rectangular(
//!     10.0,
//!     8.0,
//!     vec![],
//!     vec![],
//! ))?);
//! let start = Pose2D::new(1.0, 1.0, 0.0);
//! let robot = SimulatedRobot::new(map.clone(), SimulationConfig::ideal(start))?;
//! let planner = GraphPlanner::new(map.clone(), GridPlannerConfig::default())?;
//! let filter = ParticleFilter::new(ParticleFilterConfig::tracking(), map, start)?;
//!
//! let mut nav = NavigationController::new(
//!     ControllerConfig::default(),
//!     Box::new(planner),
//!     filter,
//!     robot.clone(),
//!     robot,
//!     start,
//! )?;
//! let report = nav.goto(Point2D::new(7.0, 5.0))?;
//! assert!(report.remaining_distance <= 1.0);
//! # Ok::<(), marga_nav::NavError>(())
//! ```

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Algorithms (depends on core)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 3: Navigation (depends on core, algorithms)
// ============================================================================
pub mod navigation;

// ============================================================================
// Layer 4: I/O capabilities (depends on all layers)
// ============================================================================
pub mod io;

pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::math;
pub use core::types::{Point2D, Pose2D, RangeScan};

// Algorithms - Mapping
pub use algorithms::mapping::{
    Bounds, DEFAULT_MAX_RANGE, MapDescription, OccupancyMap, Polygon, Rect, Seat,
};

// Algorithms - Localization
pub use algorithms::localization::{
    NoisePolicy, OdometryDelta, Particle, ParticleFilter, ParticleFilterConfig,
    ParticleFilterState, PerturbationConfig, RayCastSensorModel,
};

// Algorithms - Planning
pub use algorithms::planning::{
    GraphPlanner, GridCell, GridGraph, GridPlannerConfig, MotionInstruction, PathPlanner,
    PlannedRoute, PlannerKind, RrtStarConfig, RrtStarPlanner, build_planner,
};

// Navigation
pub use navigation::{
    CancelToken, ControllerConfig, GotoReport, NamedSpeed, NavState, NavigationController,
    ScanOverlay, SpeedMode, SpeedPercent, SpeedProfile, batch_odometry,
};

// I/O
pub use io::{
    MotionExecutor, RangeScanner, RotationScanner, SimulatedRobot, SimulationConfig,
    SingleBeamSensor,
};

pub use config::{MargaConfig, PlannerSection};
pub use error::{NavError, Result};
