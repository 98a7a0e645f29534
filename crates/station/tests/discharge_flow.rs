//! Integration tests for the discharge coordinator over the in-memory station.

use std::time::Duration;

use common::{ContainerId, ShipmentId};
use domain::{Container, DischargeError, DischargeSession, DischargeState, Liters, Shipment};
use station::{DischargeConfig, DischargeCoordinator, InMemoryStation};

type TestCoordinator = DischargeCoordinator<InMemoryStation, InMemoryStation, InMemoryStation>;

struct TestHarness {
    coordinator: TestCoordinator,
    station: InMemoryStation,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(DischargeConfig::default())
    }

    fn with_config(config: DischargeConfig) -> Self {
        let station = InMemoryStation::new();
        station.add_shipment(
            Shipment::new(1u64, "Diesel", 10000.0)
                .with_invoice("INV-1001")
                .with_supplier("Gulf Petroleum"),
        );
        station.add_shipment(
            Shipment::new(2u64, "Kerosene", 3000.0)
                .with_invoice("INV-1002")
                .with_supplier("Northern Fuels"),
        );
        station.add_container(Container::new(1u64, "T1", "Diesel", 2000.0, 8000.0));
        station.add_container(Container::new(2u64, "T2", "Diesel", 500.0, 5000.0));
        station.add_container(Container::new(3u64, "T3", "Petrol 95", 1000.0, 10000.0));

        let coordinator =
            DischargeCoordinator::new(station.clone(), station.clone(), station.clone(), config);
        Self {
            coordinator,
            station,
        }
    }

    async fn distributing(&self, q1: f64, q2: f64) -> DischargeSession {
        let mut session = self.coordinator.open_session();
        self.coordinator.load_pending(&mut session).await.unwrap();
        self.coordinator
            .select_shipment(&mut session, &ShipmentId::from(1u64))
            .await
            .unwrap();
        session.set_quantity(&ContainerId::from(1u64), q1).unwrap();
        session.set_quantity(&ContainerId::from(2u64), q2).unwrap();
        session
    }

    fn level(&self, id: u64) -> Liters {
        self.station
            .container(&ContainerId::from(id))
            .unwrap()
            .current_level
    }
}

#[tokio::test]
async fn test_happy_path_commits_and_updates_levels() {
    let h = TestHarness::new();
    let mut session = h.distributing(6000.0, 4000.0).await;

    let request = h.coordinator.submit(&mut session).await.unwrap();

    assert_eq!(request.shipment_id, ShipmentId::from(1u64));
    assert_eq!(session.state(), DischargeState::Committed);
    assert_eq!(h.level(1), Liters::new(8000.0));
    assert_eq!(h.level(2), Liters::new(4500.0));
    assert_eq!(h.level(3), Liters::new(1000.0));
    assert_eq!(h.station.discharge_count(), 2);
}

#[tokio::test]
async fn test_load_pending_lists_newest_first() {
    let h = TestHarness::new();
    let mut session = h.coordinator.open_session();

    let count = h.coordinator.load_pending(&mut session).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(session.pending()[0].id, ShipmentId::from(2u64));
    assert_eq!(session.search("gulf").len(), 1);
}

#[tokio::test]
async fn test_selection_keeps_only_matching_tanks() {
    let h = TestHarness::new();
    let session = h.distributing(0.0, 0.0).await;

    let names: Vec<&str> = session
        .lines()
        .iter()
        .map(|l| l.container.name.as_str())
        .collect();
    assert_eq!(names, vec!["T1", "T2"]);
    assert_eq!(session.state(), DischargeState::Distributing);
}

#[tokio::test]
async fn test_overflow_blocks_commit() {
    let h = TestHarness::new();
    let mut session = h.distributing(7000.0, 3000.0).await;

    let err = h.coordinator.submit(&mut session).await.unwrap_err();

    assert!(matches!(err, DischargeError::CapacityExceeded { ref container_name, .. } if container_name == "T1"));
    assert_eq!(session.state(), DischargeState::Distributing);
    assert_eq!(h.station.discharge_count(), 0);
    assert_eq!(h.level(1), Liters::new(2000.0));
}

#[tokio::test]
async fn test_volume_mismatch_blocks_commit() {
    let h = TestHarness::new();
    let mut session = h.distributing(5000.0, 3000.0).await;

    let err = h.coordinator.submit(&mut session).await.unwrap_err();

    assert_eq!(
        err,
        DischargeError::VolumeMismatch {
            assigned: Liters::new(8000.0),
            ordered: Liters::new(10000.0),
        }
    );
    assert_eq!(session.state(), DischargeState::Distributing);

    session.set_quantity(&ContainerId::from(1u64), 5500.0).unwrap();
    session.set_quantity(&ContainerId::from(2u64), 4500.0).unwrap();
    h.coordinator.submit(&mut session).await.unwrap();
    assert_eq!(session.state(), DischargeState::Committed);
}

#[tokio::test]
async fn test_no_eligible_tanks() {
    let h = TestHarness::new();
    let mut session = h.coordinator.open_session();
    h.coordinator.load_pending(&mut session).await.unwrap();

    let err = h
        .coordinator
        .select_shipment(&mut session, &ShipmentId::from(2u64))
        .await
        .unwrap_err();

    assert!(err.is_warning());
    assert_eq!(session.state(), DischargeState::SelectingShipment);
    assert!(session.shipment().is_none());
}

#[tokio::test]
async fn test_commit_rejection_message_is_verbatim() {
    let h = TestHarness::new();
    h.station
        .set_commit_rejection(Some("Tank T2 is locked for calibration"));
    let mut session = h.distributing(6000.0, 4000.0).await;

    let err = h.coordinator.submit(&mut session).await.unwrap_err();

    assert_eq!(err.to_string(), "Tank T2 is locked for calibration");
    assert!(!err.is_retryable());
    assert_eq!(session.state(), DischargeState::Failed);
    assert_eq!(session.failure(), Some("Tank T2 is locked for calibration"));
    assert_eq!(session.lines()[0].quantity, Liters::new(6000.0));
    assert_eq!(h.level(1), Liters::new(2000.0));
}

#[tokio::test]
async fn test_stale_level_conflict_then_resubmit() {
    let h = TestHarness::new();
    let mut session = h.distributing(6000.0, 4000.0).await;
    // Another delivery lands in T1 after the operator loaded the levels.
    h.station
        .adjust_level(&ContainerId::from(1u64), 500.0)
        .unwrap();

    let err = h.coordinator.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, DischargeError::CommitFailed { retryable: false, .. }));
    assert_eq!(session.state(), DischargeState::Failed);
    assert_eq!(h.station.discharge_count(), 0);

    session.resume_distributing().unwrap();
    session.set_quantity(&ContainerId::from(1u64), 5500.0).unwrap();
    session.set_quantity(&ContainerId::from(2u64), 4500.0).unwrap();
    h.coordinator.submit(&mut session).await.unwrap();

    assert_eq!(session.state(), DischargeState::Committed);
    assert_eq!(h.level(1), Liters::new(8000.0));
    assert_eq!(h.level(2), Liters::new(5000.0));
}

#[tokio::test]
async fn test_resubmit_after_transient_rejection() {
    let h = TestHarness::new();
    h.station.set_commit_rejection(Some("Database is busy"));
    let mut session = h.distributing(6000.0, 4000.0).await;
    h.coordinator.submit(&mut session).await.unwrap_err();

    h.station.set_commit_rejection(None);
    h.coordinator.resubmit(&mut session).await.unwrap();

    assert_eq!(session.state(), DischargeState::Committed);
    assert_eq!(session.failure(), None);
}

#[tokio::test(start_paused = true)]
async fn test_commit_timeout_is_retryable_failure() {
    let h = TestHarness::with_config(
        DischargeConfig::default().with_commit_timeout(Duration::from_millis(100)),
    );
    h.station.set_commit_delay(Some(Duration::from_secs(5)));
    let mut session = h.distributing(6000.0, 4000.0).await;

    let err = h.coordinator.submit(&mut session).await.unwrap_err();

    assert!(matches!(err, DischargeError::CommitFailed { retryable: true, .. }));
    assert_eq!(session.state(), DischargeState::Failed);
    assert_eq!(h.station.discharge_count(), 0);
    assert!(h.station.shipment(&ShipmentId::from(1u64)).unwrap().is_pending());
}

#[tokio::test]
async fn test_second_submit_rejected_after_commit() {
    let h = TestHarness::new();
    let mut session = h.distributing(6000.0, 4000.0).await;
    h.coordinator.submit(&mut session).await.unwrap();

    let err = h.coordinator.submit(&mut session).await.unwrap_err();

    assert!(matches!(err, DischargeError::InvalidState { .. }));
    assert_eq!(h.station.discharge_count(), 2);
}

#[tokio::test]
async fn test_fetch_failure_is_reported() {
    let h = TestHarness::new();
    h.station.set_fail_on_fetch(true);
    let mut session = h.coordinator.open_session();

    let err = h.coordinator.load_pending(&mut session).await.unwrap_err();

    assert!(matches!(err, DischargeError::FetchFailed { resource: "shipments", .. }));
    assert!(err.is_retryable());
    assert!(h.coordinator.refresh().await.is_err());
}

#[tokio::test]
async fn test_refresh_after_commit() {
    let h = TestHarness::new();
    let mut session = h.distributing(6000.0, 4000.0).await;
    h.coordinator.submit(&mut session).await.unwrap();

    let snapshot = h.coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.shipments.len(), 1);
    assert_eq!(snapshot.shipments[0].id, ShipmentId::from(2u64));
    let t1 = snapshot
        .containers
        .iter()
        .find(|c| c.name == "T1")
        .unwrap();
    assert_eq!(t1.fill_percentage(), 100.0);

    session.reset();
    assert_eq!(session.state(), DischargeState::SelectingShipment);
}

#[tokio::test]
async fn test_load_containers_after_commit() {
    let h = TestHarness::new();
    let mut session = h.distributing(6000.0, 4000.0).await;
    h.coordinator.submit(&mut session).await.unwrap();

    let tanks = h.coordinator.load_containers().await.unwrap();

    assert_eq!(tanks.len(), 3);
    assert_eq!(tanks[1].current_level, Liters::new(4500.0));

    h.station.set_fail_on_fetch(true);
    let err = h.coordinator.load_containers().await.unwrap_err();
    assert!(matches!(err, DischargeError::FetchFailed { resource: "containers", .. }));
}
