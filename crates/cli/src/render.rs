//! Plain-text rendering of shipments, tanks and distributions.

use std::fmt::Write;

use domain::{Container, DischargeSession, Shipment};

pub fn shipments(list: &[&Shipment]) -> String {
    if list.is_empty() {
        return "No pending shipments\n".to_string();
    }
    let mut out = String::new();
    for s in list {
        let _ = writeln!(
            out,
            "{:<6} {:<12} {:<24} {:<12} {:>12.2} L",
            s.id, s.invoice_number, s.supplier_name, s.fuel_label, s.ordered_volume.value()
        );
    }
    out
}

pub fn tanks(list: &[Container]) -> String {
    let mut out = String::new();
    for c in list {
        let _ = writeln!(
            out,
            "{:<6} {:<10} {:<12} {:>10.2} / {:>10.2} L  {:>5.1}%",
            c.id,
            c.name,
            c.product_type,
            c.current_level.value(),
            c.capacity.value(),
            c.fill_percentage()
        );
    }
    out
}

/// Per-tank projection of the current distribution plus the totals.
pub fn distribution(session: &DischargeSession) -> String {
    let mut out = String::new();
    for line in session.lines() {
        let _ = writeln!(
            out,
            "{:<10} +{:>10.2} L -> {:>10.2} / {:>10.2} L  {:>5.1}%{}",
            line.container.name,
            line.quantity.value(),
            line.final_level().value(),
            line.container.capacity.value(),
            line.fill_percentage(),
            if line.overflowed() { "  OVER CAPACITY" } else { "" }
        );
    }
    let summary = session.summary();
    let _ = writeln!(
        out,
        "ordered {:.2} L, assigned {:.2} L, remaining {:.2} L",
        summary.ordered.value(),
        summary.assigned.value(),
        summary.remaining.value()
    );
    out
}
