//! Shared types for the fuel discharge system.

pub mod types;

pub use types::{ContainerId, ShipmentId};
