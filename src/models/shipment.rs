use serde::{Deserialize, Serialize};

/// Read-only shipment context used to enrich alert listings. Owned by the
/// shipment registry, not by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentContext {
    pub origin: String,
    pub destination: String,
    pub current_location: Option<String>,
    pub status: String,
}
