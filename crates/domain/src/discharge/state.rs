//! Discharge session state machine.

use serde::{Deserialize, Serialize};

/// The state of a discharge operation.
///
/// State transitions:
/// ```text
/// SelectingShipment ──► Distributing ──► Committing ──┬──► Committed
///         ▲                  ▲                        └──► Failed
///         │                  └──── resume ─────────────────┘
///         └──────────────── reset (from any state) ─────────
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DischargeState {
    /// Operator is picking a pending shipment.
    #[default]
    SelectingShipment,

    /// Operator is editing per-tank quantities.
    Distributing,

    /// Allocation passed validation and a commit call is in flight.
    Committing,

    /// The commit collaborator accepted the allocation (terminal state).
    Committed,

    /// The commit collaborator rejected the allocation (terminal state).
    Failed,
}

impl DischargeState {
    /// Returns true if a shipment can be picked in this state.
    pub fn can_select_shipment(&self) -> bool {
        matches!(self, DischargeState::SelectingShipment)
    }

    /// Returns true if quantities can be edited in this state.
    pub fn can_edit(&self) -> bool {
        matches!(self, DischargeState::Distributing)
    }

    /// Returns true if the submit action is enabled in this state.
    pub fn can_submit(&self) -> bool {
        matches!(self, DischargeState::Distributing)
    }

    /// Returns true if a commit outcome can be recorded in this state.
    pub fn can_finish_commit(&self) -> bool {
        matches!(self, DischargeState::Committing)
    }

    /// Returns true if the operator can go back to editing after a failure.
    pub fn can_resume(&self) -> bool {
        matches!(self, DischargeState::Failed)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DischargeState::Committed | DischargeState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DischargeState::SelectingShipment => "SelectingShipment",
            DischargeState::Distributing => "Distributing",
            DischargeState::Committing => "Committing",
            DischargeState::Committed => "Committed",
            DischargeState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for DischargeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
