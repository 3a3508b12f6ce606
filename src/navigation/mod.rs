//! Navigation module.
//!
//! Closed-loop control that ties planning, execution, sensing and
//! localization together.
//!
//! # Components
//!
//! - [`NavigationController`]: goto loop over pluggable planners
//! - [`batch_odometry`]: odometry delta of an executed batch
//! - [`SpeedMode`]: named or explicit drive speed
//! - [`ScanOverlay`]: debug projection of the last fused scan
//! - [`CancelToken`], [`NavState`]: cancellation and progress state

mod controller;
mod odometry;
mod overlay;
mod speed;
mod state;

pub use controller::{ControllerConfig, GotoReport, NavigationController};
pub use odometry::batch_odometry;
pub use overlay::ScanOverlay;
pub use speed::{NamedSpeed, SpeedMode, SpeedPercent, SpeedProfile};
pub use state::{CancelToken, NavState};
