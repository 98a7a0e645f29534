//! Discharge coordinator driving a session against the station backend.

use std::time::Instant;

use common::ShipmentId;
use domain::{CommitRequest, Container, DischargeError, DischargeSession, Shipment};

use crate::config::DischargeConfig;
use crate::error::StationError;
use crate::services::{ContainerInventory, DischargeCommitter, PendingShipments};

/// Pending shipments and tank levels fetched together.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    pub shipments: Vec<Shipment>,
    pub containers: Vec<Container>,
}

/// Runs the I/O side of a discharge.
///
/// The [`DischargeSession`] holds all state and decides every transition;
/// the coordinator fetches what the session needs, hands the validated
/// allocation to the committer and feeds the outcome back. A commit that
/// does not finish within the configured timeout is recorded as a
/// retryable failure.
pub struct DischargeCoordinator<P, C, K>
where
    P: PendingShipments,
    C: ContainerInventory,
    K: DischargeCommitter,
{
    shipments: P,
    containers: C,
    committer: K,
    config: DischargeConfig,
}

impl<P, C, K> DischargeCoordinator<P, C, K>
where
    P: PendingShipments,
    C: ContainerInventory,
    K: DischargeCommitter,
{
    /// Creates a new coordinator.
    pub fn new(shipments: P, containers: C, committer: K, config: DischargeConfig) -> Self {
        Self {
            shipments,
            containers,
            committer,
            config,
        }
    }

    pub fn config(&self) -> &DischargeConfig {
        &self.config
    }

    /// Starts a fresh session using the configured tolerance.
    pub fn open_session(&self) -> DischargeSession {
        metrics::counter!("discharge_sessions_total").increment(1);
        DischargeSession::new(self.config.volume_tolerance)
    }

    /// Fetches pending shipments into the session.
    ///
    /// Returns the number of shipments available for selection.
    #[tracing::instrument(skip(self, session))]
    pub async fn load_pending(&self, session: &mut DischargeSession) -> Result<usize, DischargeError> {
        let shipments = self
            .shipments
            .fetch_pending_shipments()
            .await
            .map_err(|e| fetch_failed("shipments", e))?;
        session.set_pending(shipments);
        tracing::info!(count = session.pending().len(), "pending shipments loaded");
        Ok(session.pending().len())
    }

    /// Fetches current tank levels and selects the shipment.
    #[tracing::instrument(skip(self, session, shipment_id), fields(shipment_id = %shipment_id))]
    pub async fn select_shipment(
        &self,
        session: &mut DischargeSession,
        shipment_id: &ShipmentId,
    ) -> Result<(), DischargeError> {
        if !session.state().can_select_shipment() {
            return Err(DischargeError::InvalidState {
                action: "select shipment",
                current_state: session.state(),
            });
        }

        let containers = self
            .containers
            .fetch_containers()
            .await
            .map_err(|e| fetch_failed("containers", e))?;
        session.select_shipment(shipment_id, &containers)?;
        tracing::info!(tanks = session.lines().len(), "shipment selected");
        Ok(())
    }

    /// Validates the session's allocation and commits it.
    ///
    /// Validation failures leave the session in `Distributing`. A failed or
    /// timed-out commit leaves it in `Failed` with the collaborator's message
    /// and returns `CommitFailed`. On success the session is `Committed` and
    /// the committed request is returned.
    #[tracing::instrument(skip(self, session), fields(state = %session.state()))]
    pub async fn submit(&self, session: &mut DischargeSession) -> Result<CommitRequest, DischargeError> {
        let request = match session.begin_commit() {
            Ok(request) => request,
            Err(err) => {
                if let Some(reason) = rejection_reason(&err) {
                    metrics::counter!("discharge_validation_rejections_total", "reason" => reason)
                        .increment(1);
                    tracing::warn!(error = %err, "allocation rejected");
                }
                return Err(err);
            }
        };

        tracing::info!(
            shipment_id = %request.shipment_id,
            total = %request.allocation.total(),
            tanks = request.allocation.len(),
            "committing discharge"
        );
        metrics::counter!("discharge_commits_total").increment(1);
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
            self.config.commit_timeout,
            self.committer
                .commit_allocation(&request.shipment_id, &request.allocation),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StationError::Timeout(self.config.commit_timeout)),
        };
        metrics::histogram!("discharge_commit_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(()) => {
                session.finish_commit(Ok(()))?;
                tracing::info!(shipment_id = %request.shipment_id, "discharge committed");
                Ok(request)
            }
            Err(err) => {
                let message = err.to_string();
                let retryable = err.is_retryable();
                session.finish_commit(Err(message.clone()))?;
                metrics::counter!("discharge_commit_failures_total").increment(1);
                tracing::warn!(
                    shipment_id = %request.shipment_id,
                    error = %message,
                    retryable,
                    "discharge commit failed"
                );
                Err(DischargeError::CommitFailed { message, retryable })
            }
        }
    }

    /// Returns a failed session to editing and submits it again.
    pub async fn resubmit(&self, session: &mut DischargeSession) -> Result<CommitRequest, DischargeError> {
        session.resume_distributing()?;
        self.submit(session).await
    }

    /// Fetches current tank levels.
    #[tracing::instrument(skip(self))]
    pub async fn load_containers(&self) -> Result<Vec<Container>, DischargeError> {
        self.containers
            .fetch_containers()
            .await
            .map_err(|e| fetch_failed("containers", e))
    }

    /// Fetches pending shipments and tank levels concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<StationSnapshot, DischargeError> {
        let (shipments, containers) = tokio::try_join!(
            async {
                self.shipments
                    .fetch_pending_shipments()
                    .await
                    .map_err(|e| fetch_failed("shipments", e))
            },
            async {
                self.containers
                    .fetch_containers()
                    .await
                    .map_err(|e| fetch_failed("containers", e))
            },
        )?;
        Ok(StationSnapshot {
            shipments,
            containers,
        })
    }
}

fn fetch_failed(resource: &'static str, err: StationError) -> DischargeError {
    tracing::warn!(resource, error = %err, "station fetch failed");
    DischargeError::FetchFailed {
        resource,
        message: err.to_string(),
    }
}

fn rejection_reason(err: &DischargeError) -> Option<&'static str> {
    match err {
        DischargeError::VolumeMismatch { .. } => Some("volume_mismatch"),
        DischargeError::CapacityExceeded { .. } => Some("capacity_exceeded"),
        DischargeError::InvalidQuantity { .. } => Some("invalid_quantity"),
        _ => None,
    }
}
