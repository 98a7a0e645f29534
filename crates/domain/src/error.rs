//! Discharge error types.

use common::{ContainerId, ShipmentId};
use thiserror::Error;

use crate::discharge::{DischargeState, Liters};

/// Errors that can occur while selecting, distributing, or committing a
/// shipment discharge.
///
/// None of these are fatal: every variant leaves the session usable and is
/// meant to be shown to the operator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DischargeError {
    /// No tank carries the shipment's fuel type.
    #[error("No tanks match fuel type: {fuel_label}")]
    NoEligibleContainers { fuel_label: String },

    /// The distributed total differs from the shipment volume by more than
    /// the tolerance.
    #[error("Distributed volume ({assigned}) does not match shipment volume ({ordered})")]
    VolumeMismatch { assigned: Liters, ordered: Liters },

    /// A tank would end up above its capacity.
    #[error("Tank {container_name} would be filled above capacity ({final_level} > {capacity})")]
    CapacityExceeded {
        container_id: ContainerId,
        container_name: String,
        final_level: Liters,
        capacity: Liters,
    },

    /// The commit collaborator reported an error; the message is kept verbatim.
    #[error("{message}")]
    CommitFailed { message: String, retryable: bool },

    /// Loading shipments or tanks failed.
    #[error("Failed to load {resource}: {message}")]
    FetchFailed {
        resource: &'static str,
        message: String,
    },

    /// The session is not in a state that allows the action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidState {
        action: &'static str,
        current_state: DischargeState,
    },

    /// Operator entered a negative or non-numeric quantity.
    #[error("Invalid quantity: {value} (must be a non-negative number)")]
    InvalidQuantity { value: f64 },

    /// Quantity addressed to a tank outside the distribution.
    #[error("Unknown tank: {0}")]
    UnknownContainer(ContainerId),

    /// Shipment is not in the pending list.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),
}

impl DischargeError {
    /// Returns true for notices that inform rather than reject
    /// (the operator has nothing to correct).
    pub fn is_warning(&self) -> bool {
        matches!(self, DischargeError::NoEligibleContainers { .. })
    }

    /// Returns true if re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DischargeError::CommitFailed { retryable, .. } => *retryable,
            DischargeError::FetchFailed { .. } => true,
            _ => false,
        }
    }
}

/// Convenience type alias for discharge results.
pub type Result<T> = std::result::Result<T, DischargeError>;
