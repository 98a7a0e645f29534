//! Station backend error types.

use std::time::Duration;

use common::{ContainerId, ShipmentId};
use thiserror::Error;

/// Errors reported by the station backend collaborators.
#[derive(Debug, Error)]
pub enum StationError {
    /// The backend could not be reached or answered with a server error.
    #[error("Station backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request; the message is its own.
    #[error("{0}")]
    Rejected(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a body that could not be understood.
    #[error("Unexpected response from station backend: {0}")]
    Decode(String),

    /// Shipment does not exist on the backend.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// Tank does not exist on the backend.
    #[error("Tank not found: {0}")]
    ContainerNotFound(ContainerId),

    /// The request conflicts with the backend's current data, e.g. a tank
    /// level moved since the operator loaded it.
    #[error("{0}")]
    Conflict(String),
}

impl StationError {
    /// Returns true if the same request may succeed when sent again
    /// unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StationError::Unavailable(_) | StationError::Timeout(_) | StationError::Http(_)
        )
    }
}

/// Convenience type alias for station results.
pub type Result<T> = std::result::Result<T, StationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = StationError::Rejected("الخزان مقفل".to_string());
        assert_eq!(err.to_string(), "الخزان مقفل");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(StationError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(StationError::Unavailable("503".to_string()).is_retryable());
        assert!(!StationError::Conflict("stale".to_string()).is_retryable());
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            StationError::Timeout(Duration::from_secs(30)).to_string(),
            "Request timed out after 30s"
        );
    }
}
