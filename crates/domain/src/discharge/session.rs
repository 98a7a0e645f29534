//! A single discharge operation: pick a shipment, distribute it, commit it.

use common::{ContainerId, ShipmentId};
use serde::{Deserialize, Serialize};

use super::allocation::{DEFAULT_VOLUME_TOLERANCE, check_gate, check_quantity};
use super::model::{display_percentage, raw_percentage};
use super::{Allocation, Container, DischargeState, Liters, Shipment};
use crate::error::DischargeError;
use crate::fuel;

/// One eligible tank and the quantity the operator assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub container: Container,
    pub quantity: Liters,
}

impl AllocationLine {
    fn new(container: Container) -> Self {
        Self {
            container,
            quantity: Liters::ZERO,
        }
    }

    /// Tank level after this line is discharged.
    pub fn final_level(&self) -> Liters {
        self.container.current_level + self.quantity
    }

    /// Final fill percentage, unclamped. Values above 100 mean overflow.
    pub fn raw_fill_percentage(&self) -> f64 {
        raw_percentage(self.final_level(), self.container.capacity)
    }

    /// Final fill percentage clamped to `[0, 100]` for display.
    pub fn fill_percentage(&self) -> f64 {
        display_percentage(self.final_level(), self.container.capacity)
    }

    /// Returns true if the final level exceeds capacity.
    pub fn overflowed(&self) -> bool {
        self.final_level() > self.container.capacity
    }
}

/// Running totals shown while distributing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub ordered: Liters,
    pub assigned: Liters,
    /// `ordered - assigned`; negative when over-assigned.
    pub remaining: Liters,
}

/// What a validated session hands to the commit collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub shipment_id: ShipmentId,
    pub allocation: Allocation,
}

/// State of one discharge operation.
///
/// The session is a plain value owned by the caller; every transition is an
/// explicit method and nothing here performs I/O. Fetching shipments and
/// tanks and running the commit belong to the caller (see the `station`
/// crate's coordinator).
#[derive(Debug, Clone)]
pub struct DischargeSession {
    state: DischargeState,
    tolerance: Liters,
    pending: Vec<Shipment>,
    shipment: Option<Shipment>,
    lines: Vec<AllocationLine>,
    failure: Option<String>,
}

impl Default for DischargeSession {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME_TOLERANCE)
    }
}

impl DischargeSession {
    /// Creates a session in `SelectingShipment` with an empty pending list.
    pub fn new(tolerance: Liters) -> Self {
        Self {
            state: DischargeState::SelectingShipment,
            tolerance,
            pending: Vec::new(),
            shipment: None,
            lines: Vec::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> DischargeState {
        self.state
    }

    pub fn tolerance(&self) -> Liters {
        self.tolerance
    }

    /// The shipment being distributed, once one is selected.
    pub fn shipment(&self) -> Option<&Shipment> {
        self.shipment.as_ref()
    }

    /// Eligible tanks with their assigned quantities, in input order.
    pub fn lines(&self) -> &[AllocationLine] {
        &self.lines
    }

    /// Collaborator message of the last failed commit.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns true if the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.state.can_submit()
    }

    /// Replaces the list of shipments available for selection.
    ///
    /// Only pending shipments are kept.
    pub fn set_pending(&mut self, shipments: Vec<Shipment>) {
        self.pending = shipments.into_iter().filter(Shipment::is_pending).collect();
    }

    pub fn pending(&self) -> &[Shipment] {
        &self.pending
    }

    /// Pending shipments whose invoice number or supplier name contains
    /// `term`, case-insensitively.
    pub fn search(&self, term: &str) -> Vec<&Shipment> {
        self.pending
            .iter()
            .filter(|s| s.matches_search(term))
            .collect()
    }

    /// Picks a shipment and opens the distribution over the tanks carrying
    /// its fuel type, each starting at zero.
    ///
    /// When no tank matches, returns `NoEligibleContainers` and stays in
    /// `SelectingShipment`.
    pub fn select_shipment(
        &mut self,
        shipment_id: &ShipmentId,
        containers: &[Container],
    ) -> Result<(), DischargeError> {
        self.ensure(self.state.can_select_shipment(), "select shipment")?;

        let shipment = self
            .pending
            .iter()
            .find(|s| &s.id == shipment_id)
            .cloned()
            .ok_or_else(|| DischargeError::ShipmentNotFound(shipment_id.clone()))?;

        let category = shipment.fuel_category();
        let eligible = fuel::eligible_containers(&category, containers);
        if eligible.is_empty() {
            tracing::warn!(
                %shipment_id,
                fuel = %shipment.fuel_label,
                "no tanks match shipment fuel type"
            );
            return Err(DischargeError::NoEligibleContainers {
                fuel_label: shipment.fuel_label,
            });
        }

        self.lines = eligible
            .into_iter()
            .cloned()
            .map(AllocationLine::new)
            .collect();
        tracing::debug!(
            %shipment_id,
            %category,
            tanks = self.lines.len(),
            "distribution opened"
        );
        self.shipment = Some(shipment);
        self.state = DischargeState::Distributing;
        Ok(())
    }

    /// Sets the quantity assigned to one tank.
    pub fn set_quantity(
        &mut self,
        container_id: &ContainerId,
        value: f64,
    ) -> Result<(), DischargeError> {
        self.ensure(self.state.can_edit(), "edit quantities")?;
        let quantity = Liters::new(value);
        check_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.container.id == container_id)
            .ok_or_else(|| DischargeError::UnknownContainer(container_id.clone()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Sum of all assigned quantities.
    pub fn total_assigned(&self) -> Liters {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Ordered volume minus the assigned total (zero before selection).
    pub fn remaining(&self) -> Liters {
        self.summary().remaining
    }

    pub fn summary(&self) -> DistributionSummary {
        let ordered = self
            .shipment
            .as_ref()
            .map(|s| s.ordered_volume)
            .unwrap_or(Liters::ZERO);
        let assigned = self.total_assigned();
        DistributionSummary {
            ordered,
            assigned,
            remaining: ordered - assigned,
        }
    }

    /// Current quantities as an [`Allocation`], one entry per eligible tank.
    pub fn allocation(&self) -> Allocation {
        self.lines
            .iter()
            .map(|l| (l.container.id.clone(), l.quantity))
            .collect()
    }

    /// Runs the validation gate and, when it passes, moves to `Committing`.
    ///
    /// Validation failures (`VolumeMismatch`, `CapacityExceeded`) leave the
    /// session in `Distributing` so the operator can adjust and resubmit.
    /// While a commit is in flight this returns `InvalidState`, which keeps a
    /// second commit from being dispatched.
    pub fn begin_commit(&mut self) -> Result<CommitRequest, DischargeError> {
        self.ensure(self.state.can_submit(), "submit allocation")?;
        let Some(shipment) = self.shipment.as_ref() else {
            return Err(self.invalid_state("submit allocation"));
        };

        let placements: Vec<(&Container, Liters)> = self
            .lines
            .iter()
            .map(|l| (&l.container, l.quantity))
            .collect();
        check_gate(shipment.ordered_volume, self.tolerance, &placements)?;

        let request = CommitRequest {
            shipment_id: shipment.id.clone(),
            allocation: self.allocation(),
        };
        self.state = DischargeState::Committing;
        self.failure = None;
        Ok(request)
    }

    /// Records the outcome of the commit call.
    pub fn finish_commit(
        &mut self,
        outcome: Result<(), String>,
    ) -> Result<DischargeState, DischargeError> {
        self.ensure(self.state.can_finish_commit(), "finish commit")?;
        match outcome {
            Ok(()) => self.state = DischargeState::Committed,
            Err(message) => {
                self.failure = Some(message);
                self.state = DischargeState::Failed;
            }
        }
        Ok(self.state)
    }

    /// Returns to editing after a failed commit, keeping every quantity.
    pub fn resume_distributing(&mut self) -> Result<(), DischargeError> {
        self.ensure(self.state.can_resume(), "resume distributing")?;
        self.state = DischargeState::Distributing;
        Ok(())
    }

    /// Drops the selected shipment and all edits and goes back to
    /// `SelectingShipment`. The pending list is kept.
    pub fn reset(&mut self) {
        self.state = DischargeState::SelectingShipment;
        self.shipment = None;
        self.lines.clear();
        self.failure = None;
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), DischargeError> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid_state(action))
        }
    }

    fn invalid_state(&self, action: &'static str) -> DischargeError {
        DischargeError::InvalidState {
            action,
            current_state: self.state,
        }
    }
}
