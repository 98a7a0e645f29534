//! Subcommand execution against a discharge coordinator.

use std::fmt::Write;

use common::ShipmentId;
use domain::validate_allocation;
use station::{ContainerInventory, DischargeCommitter, DischargeCoordinator, PendingShipments};

use crate::cli::{Commands, Fill};
use crate::error::CliError;
use crate::render;

/// Runs one subcommand and returns the text to print.
pub async fn execute<P, C, K>(
    coordinator: &DischargeCoordinator<P, C, K>,
    command: Commands,
) -> Result<String, CliError>
where
    P: PendingShipments,
    C: ContainerInventory,
    K: DischargeCommitter,
{
    match command {
        Commands::Pending { search } => {
            let mut session = coordinator.open_session();
            coordinator.load_pending(&mut session).await?;
            let list = match search.as_deref() {
                Some(term) => session.search(term),
                None => session.pending().iter().collect(),
            };
            Ok(render::shipments(&list))
        }
        Commands::Tanks => {
            let containers = coordinator.load_containers().await?;
            Ok(render::tanks(&containers))
        }
        Commands::Run {
            shipment,
            fills,
            dry_run,
        } => run(coordinator, ShipmentId::new(shipment), &fills, dry_run).await,
    }
}

#[tracing::instrument(skip(coordinator, shipment_id, fills), fields(shipment_id = %shipment_id))]
async fn run<P, C, K>(
    coordinator: &DischargeCoordinator<P, C, K>,
    shipment_id: ShipmentId,
    fills: &[Fill],
    dry_run: bool,
) -> Result<String, CliError>
where
    P: PendingShipments,
    C: ContainerInventory,
    K: DischargeCommitter,
{
    let mut session = coordinator.open_session();
    coordinator.load_pending(&mut session).await?;
    coordinator.select_shipment(&mut session, &shipment_id).await?;
    for fill in fills {
        session.set_quantity(&fill.container_id, fill.liters)?;
    }

    let mut out = render::distribution(&session);

    if dry_run {
        let containers: Vec<_> = session.lines().iter().map(|l| l.container.clone()).collect();
        if let Some(shipment) = session.shipment() {
            validate_allocation(
                shipment,
                &containers,
                &session.allocation(),
                session.tolerance(),
            )?;
        }
        out.push_str("Allocation is valid (dry run, nothing committed)\n");
        return Ok(out);
    }

    coordinator.submit(&mut session).await?;
    out.push_str("Discharge committed\n");

    // The discharge is persisted at this point; a failed reload is only a warning.
    match coordinator.load_containers().await {
        Ok(containers) => {
            let touched: Vec<_> = containers
                .into_iter()
                .filter(|c| session.lines().iter().any(|l| l.container.id == c.id))
                .collect();
            out.push_str(&render::tanks(&touched));
        }
        Err(err) => {
            tracing::warn!(error = %err, "tank levels not reloaded after commit");
            let _ = writeln!(out, "warning: could not reload tank levels: {err}");
        }
    }
    Ok(out)
}
