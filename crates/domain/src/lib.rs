//! Domain layer for fuel shipment discharge.
//!
//! This crate provides:
//! - Fuel category normalization and tank eligibility matching
//! - The `Allocation` value type and its validation gate
//! - `DischargeSession`, the state machine for one discharge operation

pub mod discharge;
pub mod error;
pub mod fuel;

pub use discharge::{
    Allocation, AllocationEntry, AllocationLine, CommitRequest, Container,
    DEFAULT_VOLUME_TOLERANCE, DischargeSession, DischargeState, DistributionSummary, Liters,
    Shipment, ShipmentStatus, validate_allocation,
};
pub use error::DischargeError;
pub use fuel::{FuelCategory, eligible_containers};
