//! Shipments and storage containers.

use common::{ContainerId, ShipmentId};
use serde::{Deserialize, Serialize};

use super::Liters;
use crate::fuel::FuelCategory;

/// Lifecycle status of a shipment as reported by the station backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    /// Delivered to the station, waiting to be discharged into tanks.
    #[default]
    Pending,

    /// Fully distributed into tanks (terminal).
    Discharged,
}

impl ShipmentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Discharged => "discharged",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fuel delivery whose ordered volume must be distributed across tanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub invoice_number: String,
    pub supplier_name: String,
    pub driver_name: Option<String>,
    pub truck_number: Option<String>,
    /// Free-text fuel label as entered on the purchase (e.g. "Diesel Premium").
    pub fuel_label: String,
    pub ordered_volume: Liters,
    #[serde(default)]
    pub status: ShipmentStatus,
}

impl Shipment {
    /// Creates a pending shipment with no supplier or truck details.
    pub fn new(
        id: impl Into<ShipmentId>,
        fuel_label: impl Into<String>,
        ordered_volume: impl Into<Liters>,
    ) -> Self {
        Self {
            id: id.into(),
            invoice_number: String::new(),
            supplier_name: String::new(),
            driver_name: None,
            truck_number: None,
            fuel_label: fuel_label.into(),
            ordered_volume: ordered_volume.into(),
            status: ShipmentStatus::Pending,
        }
    }

    /// Sets the invoice number.
    pub fn with_invoice(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = invoice_number.into();
        self
    }

    /// Sets the supplier name.
    pub fn with_supplier(mut self, supplier_name: impl Into<String>) -> Self {
        self.supplier_name = supplier_name.into();
        self
    }

    /// Sets the driver and truck plate.
    pub fn with_driver(mut self, driver_name: impl Into<String>, truck_number: impl Into<String>) -> Self {
        self.driver_name = Some(driver_name.into());
        self.truck_number = Some(truck_number.into());
        self
    }

    /// Normalized fuel category of this shipment.
    pub fn fuel_category(&self) -> FuelCategory {
        FuelCategory::normalize(&self.fuel_label)
    }

    /// Returns true if the shipment is still waiting for discharge.
    pub fn is_pending(&self) -> bool {
        self.status == ShipmentStatus::Pending
    }

    /// Case-insensitive substring match on invoice number or supplier name.
    ///
    /// A blank term matches every shipment.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.invoice_number.to_lowercase().contains(&term)
            || self.supplier_name.to_lowercase().contains(&term)
    }
}

/// A storage tank that can receive part of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    /// Free-text product label of the tank (e.g. "Petrol 95").
    pub product_type: String,
    pub current_level: Liters,
    pub capacity: Liters,
}

impl Container {
    /// Creates a container description.
    pub fn new(
        id: impl Into<ContainerId>,
        name: impl Into<String>,
        product_type: impl Into<String>,
        current_level: impl Into<Liters>,
        capacity: impl Into<Liters>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            product_type: product_type.into(),
            current_level: current_level.into(),
            capacity: capacity.into(),
        }
    }

    /// Free space left before the tank is full.
    pub fn available_space(&self) -> Liters {
        self.capacity - self.current_level
    }

    /// Current fill level as a percentage, clamped to `[0, 100]`.
    pub fn fill_percentage(&self) -> f64 {
        display_percentage(self.current_level, self.capacity)
    }
}

/// Percentage of `capacity` occupied by `level`, without clamping.
///
/// A tank without a positive capacity reports zero.
pub(crate) fn raw_percentage(level: Liters, capacity: Liters) -> f64 {
    if capacity.value() <= 0.0 {
        return 0.0;
    }
    level.value() / capacity.value() * 100.0
}

pub(crate) fn display_percentage(level: Liters, capacity: Liters) -> f64 {
    raw_percentage(level, capacity).clamp(0.0, 100.0)
}
