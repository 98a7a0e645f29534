//! In-memory station backend.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ContainerId, ShipmentId};
use domain::{
    Allocation, Container, DEFAULT_VOLUME_TOLERANCE, DischargeError, Liters, Shipment,
    ShipmentStatus, validate_allocation,
};

use super::{ContainerInventory, DischargeCommitter, PendingShipments};
use crate::error::StationError;

/// One tank's share of a committed discharge.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeRecord {
    pub shipment_id: ShipmentId,
    pub container_id: ContainerId,
    pub quantity: Liters,
    pub discharged_at: DateTime<Utc>,
}

#[derive(Debug)]
struct InMemoryStationState {
    /// Insertion order; pending lists are served newest first.
    shipments: Vec<Shipment>,
    tanks: Vec<Container>,
    discharges: Vec<DischargeRecord>,
    commit_rejection: Option<String>,
    fail_on_fetch: bool,
    commit_delay: Option<Duration>,
    volume_tolerance: Liters,
}

impl Default for InMemoryStationState {
    fn default() -> Self {
        Self {
            shipments: Vec::new(),
            tanks: Vec::new(),
            discharges: Vec::new(),
            commit_rejection: None,
            fail_on_fetch: false,
            commit_delay: None,
            volume_tolerance: DEFAULT_VOLUME_TOLERANCE,
        }
    }
}

/// In-memory station backend for tests and demos.
///
/// Implements all three collaborator traits over one shared store, so a
/// commit is visible to the next fetch. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStation {
    state: Arc<RwLock<InMemoryStationState>>,
}

impl InMemoryStation {
    /// Creates an empty station.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shipment. Later shipments are listed first.
    pub fn add_shipment(&self, shipment: Shipment) {
        self.write().shipments.push(shipment);
    }

    /// Adds a tank.
    pub fn add_container(&self, container: Container) {
        self.write().tanks.push(container);
    }

    /// Makes every commit fail with the given message until cleared.
    pub fn set_commit_rejection(&self, message: Option<&str>) {
        self.write().commit_rejection = message.map(str::to_string);
    }

    /// Makes both fetch operations fail until cleared.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.write().fail_on_fetch = fail;
    }

    /// Delays every commit by `delay` before it touches the store.
    pub fn set_commit_delay(&self, delay: Option<Duration>) {
        self.write().commit_delay = delay;
    }

    /// Sets the tolerance used when a commit re-checks the allocation
    /// (default 1 L). Match it to the coordinator's `volume_tolerance`.
    pub fn set_volume_tolerance(&self, tolerance: Liters) {
        self.write().volume_tolerance = tolerance;
    }

    /// Moves a tank level by `delta` liters, as a sale or another operator's
    /// discharge would.
    pub fn adjust_level(&self, container_id: &ContainerId, delta: f64) -> Result<(), StationError> {
        let mut state = self.write();
        let tank = state
            .tanks
            .iter_mut()
            .find(|t| &t.id == container_id)
            .ok_or_else(|| StationError::ContainerNotFound(container_id.clone()))?;
        tank.current_level += Liters::new(delta);
        Ok(())
    }

    /// Returns a tank by ID.
    pub fn container(&self, container_id: &ContainerId) -> Option<Container> {
        self.read()
            .tanks
            .iter()
            .find(|t| &t.id == container_id)
            .cloned()
    }

    /// Returns a shipment by ID, whatever its status.
    pub fn shipment(&self, shipment_id: &ShipmentId) -> Option<Shipment> {
        self.read()
            .shipments
            .iter()
            .find(|s| &s.id == shipment_id)
            .cloned()
    }

    /// Returns every discharge record in commit order.
    pub fn discharges(&self) -> Vec<DischargeRecord> {
        self.read().discharges.clone()
    }

    /// Returns the number of discharge records.
    pub fn discharge_count(&self) -> usize {
        self.read().discharges.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryStationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryStationState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_fetch(&self) -> Result<(), StationError> {
        if self.read().fail_on_fetch {
            return Err(StationError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PendingShipments for InMemoryStation {
    async fn fetch_pending_shipments(&self) -> Result<Vec<Shipment>, StationError> {
        self.check_fetch()?;
        Ok(self
            .read()
            .shipments
            .iter()
            .rev()
            .filter(|s| s.is_pending())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContainerInventory for InMemoryStation {
    async fn fetch_containers(&self) -> Result<Vec<Container>, StationError> {
        self.check_fetch()?;
        Ok(self.read().tanks.clone())
    }
}

#[async_trait]
impl DischargeCommitter for InMemoryStation {
    async fn commit_allocation(
        &self,
        shipment_id: &ShipmentId,
        allocation: &Allocation,
    ) -> Result<(), StationError> {
        let delay = {
            let state = self.read();
            if let Some(message) = &state.commit_rejection {
                return Err(StationError::Rejected(message.clone()));
            }
            state.commit_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write();
        let state = &mut *state;

        let shipment = state
            .shipments
            .iter_mut()
            .find(|s| &s.id == shipment_id)
            .ok_or_else(|| StationError::ShipmentNotFound(shipment_id.clone()))?;
        if !shipment.is_pending() {
            return Err(StationError::Conflict(format!(
                "Shipment {shipment_id} has already been discharged"
            )));
        }

        // Re-check against live levels; another writer may have moved them.
        let involved: Vec<Container> = state
            .tanks
            .iter()
            .filter(|t| allocation.entries().iter().any(|e| e.container_id == t.id))
            .cloned()
            .collect();
        validate_allocation(shipment, &involved, allocation, state.volume_tolerance).map_err(
            |err| match err {
                DischargeError::UnknownContainer(id) => StationError::ContainerNotFound(id),
                DischargeError::CapacityExceeded { .. } => StationError::Conflict(err.to_string()),
                other => StationError::Rejected(other.to_string()),
            },
        )?;

        let now = Utc::now();
        for entry in allocation.entries() {
            if let Some(tank) = state.tanks.iter_mut().find(|t| t.id == entry.container_id) {
                tank.current_level += entry.quantity;
            }
            if !entry.quantity.is_zero() {
                state.discharges.push(DischargeRecord {
                    shipment_id: shipment_id.clone(),
                    container_id: entry.container_id.clone(),
                    quantity: entry.quantity,
                    discharged_at: now,
                });
            }
        }
        shipment.status = ShipmentStatus::Discharged;

        tracing::debug!(%shipment_id, tanks = allocation.len(), "discharge committed");
        Ok(())
    }
}
