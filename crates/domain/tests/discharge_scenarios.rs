//! End-to-end scenarios for a single discharge session.
//!
//! Two diesel tanks (T1: 2000/8000, T2: 500/5000) receive a 10 000 L diesel
//! shipment under different operator distributions.

use common::{ContainerId, ShipmentId};
use domain::{
    Allocation, Container, DEFAULT_VOLUME_TOLERANCE, DischargeError, DischargeSession,
    DischargeState, FuelCategory, Liters, Shipment, validate_allocation,
};

fn diesel_shipment() -> Shipment {
    Shipment::new(1u64, "Diesel", 10000.0)
        .with_invoice("INV-1001")
        .with_supplier("Gulf Petroleum")
}

fn diesel_tanks() -> Vec<Container> {
    vec![
        Container::new(1u64, "T1", "Diesel", 2000.0, 8000.0),
        Container::new(2u64, "T2", "Diesel", 500.0, 5000.0),
    ]
}

fn distribute(q1: f64, q2: f64) -> DischargeSession {
    let mut session = DischargeSession::default();
    session.set_pending(vec![diesel_shipment()]);
    session
        .select_shipment(&ShipmentId::from(1u64), &diesel_tanks())
        .unwrap();
    session.set_quantity(&ContainerId::from(1u64), q1).unwrap();
    session.set_quantity(&ContainerId::from(2u64), q2).unwrap();
    session
}

mod scenarios {
    use super::*;

    #[test]
    fn happy_path_commits() {
        let mut session = distribute(6000.0, 4000.0);
        assert_eq!(session.remaining(), Liters::ZERO);
        assert!(session.lines().iter().all(|l| !l.overflowed()));
        assert_eq!(session.lines()[0].final_level(), Liters::new(8000.0));
        assert_eq!(session.lines()[1].final_level(), Liters::new(4500.0));

        let request = session.begin_commit().unwrap();
        assert_eq!(request.shipment_id, ShipmentId::from(1u64));
        assert_eq!(request.allocation.total(), Liters::new(10000.0));
        assert_eq!(session.state(), DischargeState::Committing);

        session.finish_commit(Ok(())).unwrap();
        assert_eq!(session.state(), DischargeState::Committed);
        assert!(session.state().is_terminal());
    }

    #[test]
    fn overflow_names_first_tank() {
        let mut session = distribute(7000.0, 3000.0);
        let err = session.begin_commit().unwrap_err();
        match err {
            DischargeError::CapacityExceeded {
                container_id,
                container_name,
                final_level,
                capacity,
            } => {
                assert_eq!(container_id, ContainerId::from(1u64));
                assert_eq!(container_name, "T1");
                assert_eq!(final_level, Liters::new(9000.0));
                assert_eq!(capacity, Liters::new(8000.0));
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        assert_eq!(session.state(), DischargeState::Distributing);
    }

    #[test]
    fn mismatch_blocks_commit() {
        let mut session = distribute(5000.0, 4000.0);
        assert_eq!(
            session.begin_commit(),
            Err(DischargeError::VolumeMismatch {
                assigned: Liters::new(9000.0),
                ordered: Liters::new(10000.0),
            })
        );
        assert_eq!(session.remaining(), Liters::new(1000.0));
    }

    #[test]
    fn no_eligible_tanks_never_reaches_distribution() {
        let mut session = DischargeSession::default();
        session.set_pending(vec![Shipment::new(5u64, "gas", 3000.0)]);
        let mut tanks = diesel_tanks();
        tanks.push(Container::new(3u64, "T3", "بنزين 95", 0.0, 9000.0));

        let err = session
            .select_shipment(&ShipmentId::from(5u64), &tanks)
            .unwrap_err();
        assert!(err.is_warning());
        assert_eq!(
            err,
            DischargeError::NoEligibleContainers {
                fuel_label: "gas".to_string()
            }
        );
        assert_eq!(session.state(), DischargeState::SelectingShipment);
        assert!(session.lines().is_empty());
    }

    #[test]
    fn category_normalization() {
        assert_eq!(FuelCategory::normalize("بنزين 95"), FuelCategory::Petrol);
        assert_eq!(FuelCategory::normalize("XYZ-special").as_str(), "xyz-special");
    }
}

mod properties {
    use super::*;

    /// Every allocation the gate accepts conserves volume and fits every tank.
    #[test]
    fn accepted_allocations_conserve_volume_and_capacity() {
        let shipment = diesel_shipment();
        let tanks = diesel_tanks();

        for q1 in (0..=8000).step_by(250) {
            for q2 in (0..=6000).step_by(250) {
                let allocation: Allocation = [
                    (ContainerId::from(1u64), Liters::new(q1 as f64)),
                    (ContainerId::from(2u64), Liters::new(q2 as f64)),
                ]
                .into_iter()
                .collect();

                if validate_allocation(&shipment, &tanks, &allocation, DEFAULT_VOLUME_TOLERANCE)
                    .is_ok()
                {
                    let diff = (allocation.total() - shipment.ordered_volume).abs();
                    assert!(diff <= DEFAULT_VOLUME_TOLERANCE);
                    for tank in &tanks {
                        let final_level = tank.current_level + allocation.quantity_for(&tank.id);
                        assert!(final_level <= tank.capacity);
                    }
                }
            }
        }
    }

    #[test]
    fn session_and_standalone_gate_agree() {
        for (q1, q2) in [(6000.0, 4000.0), (7000.0, 3000.0), (5000.0, 4000.0)] {
            let mut session = distribute(q1, q2);
            let from_session = session.begin_commit().map(|_| ());
            let standalone = validate_allocation(
                &diesel_shipment(),
                &diesel_tanks(),
                &session.allocation(),
                DEFAULT_VOLUME_TOLERANCE,
            );
            assert_eq!(from_session, standalone, "q1={q1} q2={q2}");
        }
    }

    #[test]
    fn search_filters_pending_shipments() {
        let mut session = DischargeSession::default();
        session.set_pending(vec![
            diesel_shipment(),
            Shipment::new(2u64, "Petrol 91", 5000.0)
                .with_invoice("INV-2002")
                .with_supplier("Red Sea Fuels"),
        ]);

        assert_eq!(session.search("").len(), 2);
        assert_eq!(session.search("red sea").len(), 1);
        assert_eq!(session.search("inv-100")[0].id, ShipmentId::from(1u64));
        assert!(session.search("nothing").is_empty());
    }
}
