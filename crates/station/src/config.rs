//! Discharge coordinator settings.

use std::time::Duration;

use domain::{DEFAULT_VOLUME_TOLERANCE, Liters};

/// Default bound on a single commit call.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`DischargeCoordinator`](crate::DischargeCoordinator).
///
/// - `commit_timeout` — how long a commit may stay in flight before it is
///   reported as a retryable failure (default: 30 s)
/// - `volume_tolerance` — allowed gap between distributed and ordered volume
///   (default: 1 L)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeConfig {
    pub commit_timeout: Duration,
    pub volume_tolerance: Liters,
}

impl DischargeConfig {
    /// Overrides the commit timeout.
    pub fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }

    /// Overrides the volume tolerance.
    pub fn with_volume_tolerance(mut self, tolerance: Liters) -> Self {
        self.volume_tolerance = tolerance;
        self
    }
}

impl Default for DischargeConfig {
    fn default() -> Self {
        Self {
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
            volume_tolerance: DEFAULT_VOLUME_TOLERANCE,
        }
    }
}
