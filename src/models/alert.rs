use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::severity::Severity;

/// An alert candidate as produced by the risk evaluator. Only the shipment
/// and the alert type are required; everything else carries the defaults
/// the evaluator relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub shipment_id: String,
    pub alert_type: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Normally unset; the store stamps insertion time. Backfills may carry
    /// an explicit trigger time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<DateTime<Utc>>,
}

fn default_title() -> String {
    "Alert".to_string()
}

impl AlertCandidate {
    pub fn into_record(self, id: Uuid) -> AlertRecord {
        AlertRecord {
            id,
            shipment_id: self.shipment_id,
            alert_type: self.alert_type,
            severity: self.severity,
            title: self.title,
            message: self.message,
            metadata: self.metadata,
            triggered_at: self.triggered_at.unwrap_or_else(Utc::now),
            is_active: true,
            resolved_at: None,
            resolved_by: None,
        }
    }
}

/// A persisted alert. Immutable after creation except for the single
/// active -> resolved transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub shipment_id: String,
    pub alert_type: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub metadata: Map<String, Value>,
    pub triggered_at: DateTime<Utc>,
    pub is_active: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

/// An active alert joined with shipment context. The join is left-outer:
/// an alert for a shipment missing from the registry keeps empty context
/// fields instead of being dropped from the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAlert {
    #[serde(flatten)]
    pub alert: AlertRecord,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub current_location: Option<String>,
    pub shipment_status: Option<String>,
}
