//! Command-line front-end for shipment discharges.
//!
//! Talks to the station backend over HTTP through the
//! [`station::DischargeCoordinator`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use cli::{Cli, Commands, Fill, parse_fill};
pub use commands::execute;
pub use config::Config;
pub use error::CliError;
