//! Navigation state and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Navigation execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavState {
    /// No active navigation.
    #[default]
    Idle,

    /// Planning a route from the current estimate.
    Planning,

    /// Motion executor is driving a batch.
    Executing,

    /// Waiting for a scan.
    Sensing,

    /// Fusing odometry and scan into the particle filter.
    Localizing,

    /// Last goal was reached.
    Reached,

    /// Last goal failed (no path, sensor timeout, ...).
    Failed,

    /// Last goal was cancelled.
    Cancelled,
}

impl NavState {
    /// Check if a `goto` is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            NavState::Planning | NavState::Executing | NavState::Sensing | NavState::Localizing
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavState::Idle => "IDLE",
            NavState::Planning => "PLANNING",
            NavState::Executing => "EXECUTING",
            NavState::Sensing => "SENSING",
            NavState::Localizing => "LOCALIZING",
            NavState::Reached => "REACHED",
            NavState::Failed => "FAILED",
            NavState::Cancelled => "CANCELLED",
        }
    }
}

/// Shared cancellation flag, checked between instruction batches.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the running `goto`.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }

    #[test]
    fn test_active_states() {
        assert!(NavState::Executing.is_active());
        assert!(!NavState::Reached.is_active());
        assert_eq!(NavState::Cancelled.as_str(), "CANCELLED");
    }
}
