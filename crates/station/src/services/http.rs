//! JSON-over-HTTP client for the legacy station backend.
//!
//! Every endpoint answers with `{ "success": bool, "data": ..., "message": ... }`.
//! Row fields come straight from the database driver, so numbers may arrive
//! as JSON strings and ids as either numbers or strings.

use std::time::Duration;

use async_trait::async_trait;
use common::{ContainerId, ShipmentId};
use domain::{Allocation, Container, Liters, Shipment, ShipmentStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::{ContainerInventory, DischargeCommitter, PendingShipments};
use crate::error::StationError;

pub const PENDING_SHIPMENTS_PATH: &str = "/purchases/getPending";
pub const TANKS_PATH: &str = "/tanks/list";
pub const DISCHARGE_PATH: &str = "/purchases/processDischarge";

/// Default bound on each fetch request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Station backend reached over HTTP.
///
/// `request_timeout` bounds the fetch requests only. The discharge POST has
/// no client-side bound; the caller (normally the coordinator's
/// `commit_timeout`) decides how long a commit may take.
#[derive(Debug, Clone)]
pub struct HttpStationClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpStationClient {
    /// Creates a client for the backend rooted at `base_url`
    /// (e.g. `http://station.local/PETRODIESEL2/public`).
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, StationError> {
        let client = reqwest::Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, err: reqwest::Error) -> StationError {
        if err.is_timeout() {
            StationError::Timeout(self.request_timeout)
        } else if err.is_connect() {
            StationError::Unavailable(err.to_string())
        } else {
            StationError::Http(err)
        }
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, StationError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let envelope: Envelope<T> = self.read_envelope(response).await?;
        if !envelope.success {
            return Err(StationError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{path} reported failure")),
            ));
        }
        envelope
            .data
            .ok_or_else(|| StationError::Decode(format!("{path} returned no data")))
    }

    async fn read_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Envelope<T>, StationError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(StationError::Unavailable(format!(
                "station backend returned {status}"
            ))),
            Err(e) => Err(StationError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl PendingShipments for HttpStationClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_pending_shipments(&self) -> Result<Vec<Shipment>, StationError> {
        let rows: Vec<ShipmentRow> = self.get_data(PENDING_SHIPMENTS_PATH).await?;
        Ok(rows.into_iter().map(Shipment::from).collect())
    }
}

#[async_trait]
impl ContainerInventory for HttpStationClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_containers(&self) -> Result<Vec<Container>, StationError> {
        let rows: Vec<TankRow> = self.get_data(TANKS_PATH).await?;
        Ok(rows.into_iter().map(Container::from).collect())
    }
}

#[async_trait]
impl DischargeCommitter for HttpStationClient {
    #[tracing::instrument(skip(self, allocation), fields(base_url = %self.base_url))]
    async fn commit_allocation(
        &self,
        shipment_id: &ShipmentId,
        allocation: &Allocation,
    ) -> Result<(), StationError> {
        let body = DischargeBody {
            purchase_id: shipment_id.as_str(),
            tanks: allocation
                .entries()
                .iter()
                .map(|e| DischargeLine {
                    id: e.container_id.as_str(),
                    quantity: e.quantity.value(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.url(DISCHARGE_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let envelope: Envelope<serde_json::Value> = self.read_envelope(response).await?;
        if envelope.success {
            Ok(())
        } else {
            Err(StationError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Discharge was not accepted".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShipmentRow {
    #[serde(deserialize_with = "lenient_id")]
    id: String,
    #[serde(default)]
    invoice_number: Option<String>,
    #[serde(default)]
    supplier_name: Option<String>,
    #[serde(default)]
    driver_name: Option<String>,
    #[serde(default)]
    truck_number: Option<String>,
    #[serde(default)]
    fuel_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume_ordered: f64,
}

impl From<ShipmentRow> for Shipment {
    fn from(row: ShipmentRow) -> Self {
        Shipment {
            id: ShipmentId::new(row.id),
            invoice_number: row.invoice_number.unwrap_or_default(),
            supplier_name: row.supplier_name.unwrap_or_default(),
            driver_name: row.driver_name,
            truck_number: row.truck_number,
            fuel_label: row.fuel_type.unwrap_or_default(),
            ordered_volume: Liters::new(row.volume_ordered),
            status: ShipmentStatus::Pending,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TankRow {
    #[serde(deserialize_with = "lenient_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default)]
    product: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    current_volume: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    capacity_liters: f64,
}

impl From<TankRow> for Container {
    fn from(row: TankRow) -> Self {
        Container {
            id: ContainerId::new(row.id),
            name: row.name,
            product_type: row.product_type.or(row.product).unwrap_or_default(),
            current_level: Liters::new(row.current_volume),
            capacity: Liters::new(row.capacity_liters),
        }
    }
}

#[derive(Debug, Serialize)]
struct DischargeBody<'a> {
    purchase_id: &'a str,
    tanks: Vec<DischargeLine<'a>>,
}

#[derive(Debug, Serialize)]
struct DischargeLine<'a> {
    id: &'a str,
    quantity: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerOrText {
    Integer(i64),
    Text(String),
}

/// Accepts `12`, `12.5`, `"12.50"`, `""` and `null`; blanks read as zero.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(NumberOrText::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match IntegerOrText::deserialize(deserializer)? {
        IntegerOrText::Integer(n) => n.to_string(),
        IntegerOrText::Text(s) => s,
    })
}
