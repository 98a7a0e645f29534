//! Shipment discharge: distributing a delivery across storage tanks.

mod allocation;
mod model;
mod session;
mod state;
mod value_objects;

pub use allocation::{
    Allocation, AllocationEntry, DEFAULT_VOLUME_TOLERANCE, validate_allocation,
};
pub use model::{Container, Shipment, ShipmentStatus};
pub use session::{AllocationLine, CommitRequest, DischargeSession, DistributionSummary};
pub use state::DischargeState;
pub use value_objects::Liters;
