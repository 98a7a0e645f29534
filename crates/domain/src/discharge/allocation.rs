//! Allocation value type and the commit validation gate.

use common::ContainerId;
use serde::{Deserialize, Serialize};

use super::{Container, Liters, Shipment};
use crate::error::DischargeError;

/// Maximum difference between the distributed total and the ordered volume
/// that still counts as complete. Absorbs rounding from decimal input.
pub const DEFAULT_VOLUME_TOLERANCE: Liters = Liters::new(1.0);

/// Quantity assigned to a single tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub container_id: ContainerId,
    pub quantity: Liters,
}

/// A mapping from tanks to assigned quantities.
///
/// Entries keep insertion order so validation reports the first offending
/// tank in the order the operator sees them. Tanks without an entry count
/// as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation {
    entries: Vec<AllocationEntry>,
}

impl Allocation {
    /// Creates an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `quantity` to a tank, replacing any earlier assignment.
    pub fn set(&mut self, container_id: ContainerId, quantity: Liters) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.container_id == container_id)
        {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(AllocationEntry {
                container_id,
                quantity,
            }),
        }
    }

    /// Quantity assigned to a tank (zero if absent).
    pub fn quantity_for(&self, container_id: &ContainerId) -> Liters {
        self.entries
            .iter()
            .find(|e| &e.container_id == container_id)
            .map(|e| e.quantity)
            .unwrap_or(Liters::ZERO)
    }

    /// Sum of all assigned quantities.
    pub fn total(&self) -> Liters {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ContainerId, Liters)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (ContainerId, Liters)>>(iter: I) -> Self {
        let mut allocation = Allocation::new();
        for (container_id, quantity) in iter {
            allocation.set(container_id, quantity);
        }
        allocation
    }
}

/// Checks a caller-built allocation against a shipment and its tanks.
///
/// Fails with `UnknownContainer` for entries that name a tank outside
/// `containers`, `InvalidQuantity` for negative or non-finite entries, then
/// applies the same gate as [`DischargeSession::begin_commit`]
/// (volume first, capacity second).
///
/// [`DischargeSession::begin_commit`]: super::DischargeSession::begin_commit
pub fn validate_allocation(
    shipment: &Shipment,
    containers: &[Container],
    allocation: &Allocation,
    tolerance: Liters,
) -> Result<(), DischargeError> {
    for entry in allocation.entries() {
        if !containers.iter().any(|c| c.id == entry.container_id) {
            return Err(DischargeError::UnknownContainer(entry.container_id.clone()));
        }
        check_quantity(entry.quantity)?;
    }

    let placements: Vec<(&Container, Liters)> = containers
        .iter()
        .map(|c| (c, allocation.quantity_for(&c.id)))
        .collect();

    check_gate(shipment.ordered_volume, tolerance, &placements)
}

pub(crate) fn check_quantity(quantity: Liters) -> Result<(), DischargeError> {
    if !quantity.is_finite() || quantity.is_negative() {
        return Err(DischargeError::InvalidQuantity {
            value: quantity.value(),
        });
    }
    Ok(())
}

/// Conservation then capacity, over placements in display order.
pub(crate) fn check_gate(
    ordered: Liters,
    tolerance: Liters,
    placements: &[(&Container, Liters)],
) -> Result<(), DischargeError> {
    let assigned: Liters = placements.iter().map(|(_, q)| *q).sum();
    if (assigned - ordered).abs() > tolerance {
        return Err(DischargeError::VolumeMismatch { assigned, ordered });
    }

    if let Some((container, quantity)) = placements
        .iter()
        .find(|(c, q)| c.current_level + *q > c.capacity)
    {
        return Err(DischargeError::CapacityExceeded {
            container_id: container.id.clone(),
            container_name: container.name.clone(),
            final_level: container.current_level + *quantity,
            capacity: container.capacity,
        });
    }

    Ok(())
}
