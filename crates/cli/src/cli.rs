//! CLI definition using clap.

use clap::{Parser, Subcommand};
use common::ContainerId;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "discharge")]
#[command(version)]
#[command(about = "Distribute a fuel shipment across station tanks")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Station backend root URL (overrides STATION_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List shipments waiting to be discharged
    Pending {
        /// Filter by invoice number or supplier name
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// List tanks with their level, capacity and fill percentage
    Tanks,

    /// Distribute a shipment and commit it
    Run {
        /// Shipment to discharge
        #[arg(long)]
        shipment: String,

        /// Quantity for one tank, e.g. `--fill 3=6000`. Repeat per tank.
        #[arg(long = "fill", value_name = "TANK=LITERS", value_parser = parse_fill)]
        fills: Vec<Fill>,

        /// Validate only; nothing is committed
        #[arg(long)]
        dry_run: bool,
    },
}

/// One `TANK=LITERS` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub container_id: ContainerId,
    pub liters: f64,
}

/// Parses `TANK=LITERS`. Negative quantities are left for the session to
/// reject so the operator sees the same message as everywhere else.
pub fn parse_fill(arg: &str) -> Result<Fill, CliError> {
    let invalid = || CliError::InvalidFill(arg.to_string());
    let (tank, liters) = arg.split_once('=').ok_or_else(invalid)?;
    let tank = tank.trim();
    if tank.is_empty() {
        return Err(invalid());
    }
    let liters: f64 = liters.trim().parse().map_err(|_| invalid())?;
    if !liters.is_finite() {
        return Err(invalid());
    }
    Ok(Fill {
        container_id: ContainerId::new(tank),
        liters,
    })
}
