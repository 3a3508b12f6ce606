//! Error types for MargaNav.
//!
//! Planning and sensing failures abort the current `goto` call but leave the
//! controller's pose estimate untouched, so the next call replans from the
//! last fused pose. Map construction failures are rejected eagerly.

use thiserror::Error;

/// MargaNav error type
#[derive(Error, Debug)]
pub enum NavError {
    /// Goal is unreachable in the current graph or tree.
    #[error("No path from ({from_x}, {from_y}) to ({to_x}, {to_y})")]
    NoPath {
        from_x: f32,
        from_y: f32,
        to_x: f32,
        to_y: f32,
    },

    /// Predecessor chain broke while reconstructing a path (malformed map).
    #[error("Broken predecessor chain at node {node}: graph is disconnected")]
    DisconnectedGraph { node: usize },

    /// Range scan was not returned within the deadline.
    #[error("Sensor timed out after {timeout_ms} ms ({collected}/{expected} beams)")]
    SensorTimeout {
        timeout_ms: u64,
        collected: usize,
        expected: usize,
    },

    /// RRT* spent its iteration budget without reaching the goal region.
    #[error("RRT* exhausted {iterations} iterations without reaching the goal region")]
    PlanningExhausted { iterations: usize },

    /// Map description rejected at construction.
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Grid coordinate outside the planner's lattice.
    #[error("Cell ({x}, {y}) is outside the planning grid")]
    OutOfGrid { x: i32, y: i32 },

    /// Seat id not present in the map.
    #[error("Unknown seat id {0}")]
    UnknownSeat(u32),

    /// Particle population must stay non-empty.
    #[error("Invalid particle count {0}")]
    InvalidParticleCount(usize),

    /// Motion executor reported a failure.
    #[error("Motion failed: {0}")]
    Motion(String),

    /// Navigation cancelled between instruction batches.
    #[error("Navigation cancelled after {batches} batches")]
    Cancelled { batches: usize },

    /// Batch budget for one `goto` call was spent.
    #[error("Goal not reached after {count} batches (max {max})")]
    TooManyBatches { count: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Map format error: {0}")]
    MapFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NavError {
    /// Short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoPath { .. } => "NO_PATH",
            Self::DisconnectedGraph { .. } => "DISCONNECTED_GRAPH",
            Self::SensorTimeout { .. } => "SENSOR_TIMEOUT",
            Self::PlanningExhausted { .. } => "PLANNING_EXHAUSTED",
            Self::InvalidMap(_) => "INVALID_MAP",
            Self::OutOfGrid { .. } => "OUT_OF_GRID",
            Self::UnknownSeat(_) => "UNKNOWN_SEAT",
            Self::InvalidParticleCount(_) => "INVALID_PARTICLE_COUNT",
            Self::Motion(_) => "MOTION",
            Self::Cancelled { .. } => "CANCELLED",
            Self::TooManyBatches { .. } => "TOO_MANY_BATCHES",
            Self::Config(_) => "CONFIG",
            Self::MapFormat(_) => "MAP_FORMAT",
            Self::Io(_) => "IO",
        }
    }

    /// Whether a fresh `goto` from the last fused pose may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SensorTimeout { .. }
                | Self::PlanningExhausted { .. }
                | Self::Motion(_)
                | Self::Cancelled { .. }
                | Self::TooManyBatches { .. }
        )
    }
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for NavError {
    fn from(e: serde_yaml::Error) -> Self {
        NavError::MapFormat(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(NavError::DisconnectedGraph { node: 3 }.code(), "DISCONNECTED_GRAPH");
        assert_eq!(NavError::UnknownSeat(7).code(), "UNKNOWN_SEAT");
    }

    #[test]
    fn test_recoverable() {
        let timeout = NavError::SensorTimeout {
            timeout_ms: 100,
            collected: 3,
            expected: 36,
        };
        assert!(timeout.is_recoverable());
        assert!(!NavError::InvalidMap("empty".into()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = NavError::PlanningExhausted { iterations: 500 };
        assert!(err.to_string().contains("500"));
    }
}
