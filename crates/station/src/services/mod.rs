//! Station backend collaborator traits and their implementations.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use common::ShipmentId;
use domain::{Allocation, Container, Shipment};

use crate::error::StationError;

pub use http::HttpStationClient;
pub use memory::{DischargeRecord, InMemoryStation};

/// Source of shipments waiting to be discharged.
#[async_trait]
pub trait PendingShipments: Send + Sync {
    /// Returns the pending shipments, newest first.
    async fn fetch_pending_shipments(&self) -> Result<Vec<Shipment>, StationError>;
}

/// Source of tank levels and capacities.
///
/// Levels are a snapshot as of the call and may be stale by commit time.
#[async_trait]
pub trait ContainerInventory: Send + Sync {
    /// Returns every tank of the station.
    async fn fetch_containers(&self) -> Result<Vec<Container>, StationError>;
}

/// Persists a validated allocation.
#[async_trait]
pub trait DischargeCommitter: Send + Sync {
    /// Adds each quantity to its tank and marks the shipment discharged.
    ///
    /// Implementations must apply all of it or none of it.
    async fn commit_allocation(
        &self,
        shipment_id: &ShipmentId,
        allocation: &Allocation,
    ) -> Result<(), StationError>;
}
