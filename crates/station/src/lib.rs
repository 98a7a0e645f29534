//! Station backend integration for shipment discharges.
//!
//! This crate connects the pure [`domain::DischargeSession`] to the station
//! backend:
//! - collaborator traits for pending shipments, tank levels and commits
//! - an HTTP client for the legacy JSON endpoints
//! - an in-memory backend for tests and demos
//! - the [`DischargeCoordinator`] that drives a session through a commit

pub mod config;
pub mod coordinator;
pub mod error;
pub mod services;

pub use config::{DEFAULT_COMMIT_TIMEOUT, DischargeConfig};
pub use coordinator::{DischargeCoordinator, StationSnapshot};
pub use error::StationError;
pub use services::{
    ContainerInventory, DischargeCommitter, DischargeRecord, HttpStationClient, InMemoryStation,
    PendingShipments,
};
