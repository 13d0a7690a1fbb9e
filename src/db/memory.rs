use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::AlertStore;
use crate::error::AlertError;
use crate::models::alert::{ActiveAlert, AlertCandidate, AlertRecord};
use crate::models::severity::Severity;
use crate::models::shipment::ShipmentContext;
use crate::models::summary::{AlertSummary, SeverityCount};

/// In-process alert store. The single writer lock makes the dedup probe and
/// the append one critical section, so racing creators of the same pair
/// settle the same way the Postgres advisory lock settles them. Carries a
/// shipment registry for the listing join; used by the test suite and for
/// running the service without Postgres.
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<Vec<AlertRecord>>,
    shipments: RwLock<HashMap<String, ShipmentContext>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_shipment(
        &self,
        shipment_id: impl Into<String>,
        context: ShipmentContext,
    ) {
        self.shipments
            .write()
            .await
            .insert(shipment_id.into(), context);
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn find_recent_duplicate(
        &self,
        shipment_id: &str,
        alert_type: &str,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError> {
        let cutoff = Utc::now() - window;
        let alerts = self.alerts.read().await;

        Ok(alerts
            .iter()
            .filter(|a| {
                a.shipment_id == shipment_id
                    && a.alert_type == alert_type
                    && a.is_active
                    && a.triggered_at > cutoff
            })
            .max_by_key(|a| a.triggered_at)
            .cloned())
    }

    async fn insert(
        &self,
        candidate: AlertCandidate,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError> {
        let mut alerts = self.alerts.write().await;

        let cutoff = Utc::now() - window;
        let duplicate = alerts.iter().any(|a| {
            a.shipment_id == candidate.shipment_id
                && a.alert_type == candidate.alert_type
                && a.is_active
                && a.triggered_at > cutoff
        });
        if duplicate {
            return Ok(None);
        }

        let record = candidate.into_record(Uuid::new_v4());
        alerts.push(record.clone());

        Ok(Some(record))
    }

    async fn list_active(&self, limit: i64) -> Result<Vec<ActiveAlert>, AlertError> {
        let alerts = self.alerts.read().await;
        let shipments = self.shipments.read().await;

        let mut active: Vec<&AlertRecord> = alerts.iter().filter(|a| a.is_active).collect();
        active.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));

        Ok(active
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|record| {
                let context = shipments.get(&record.shipment_id);
                ActiveAlert {
                    alert: record.clone(),
                    origin: context.map(|c| c.origin.clone()),
                    destination: context.map(|c| c.destination.clone()),
                    current_location: context.and_then(|c| c.current_location.clone()),
                    shipment_status: context.map(|c| c.status.clone()),
                }
            })
            .collect())
    }

    async fn resolve(&self, id: Uuid, resolved_by: &str) -> Result<bool, AlertError> {
        let mut alerts = self.alerts.write().await;

        match alerts.iter_mut().find(|a| a.id == id && a.is_active) {
            Some(alert) => {
                alert.is_active = false;
                alert.resolved_at = Some(Utc::now());
                alert.resolved_by = Some(resolved_by.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn summarize(&self, hours: u32) -> Result<AlertSummary, AlertError> {
        let cutoff = Utc::now() - Duration::hours(i64::from(hours));
        let alerts = self.alerts.read().await;

        let in_window: Vec<&AlertRecord> =
            alerts.iter().filter(|a| a.triggered_at > cutoff).collect();

        let mut buckets: HashMap<Severity, (i64, i64)> = HashMap::new();
        for alert in &in_window {
            let entry = buckets.entry(alert.severity).or_insert((0, 0));
            entry.0 += 1;
            if alert.is_active {
                entry.1 += 1;
            }
        }

        let mut by_severity: Vec<SeverityCount> = buckets
            .into_iter()
            .map(|(severity, (count, active_count))| SeverityCount {
                severity: severity.as_str().to_string(),
                count,
                active_count,
            })
            .collect();
        by_severity.sort_by(|a, b| {
            let rank = |s: &SeverityCount| {
                Severity::parse(&s.severity)
                    .map(|sev| sev.rank())
                    .unwrap_or(0)
            };
            rank(b).cmp(&rank(a))
        });

        Ok(AlertSummary {
            total_alerts: in_window.len() as i64,
            active_alerts: in_window.iter().filter(|a| a.is_active).count() as i64,
            resolved_alerts: in_window.iter().filter(|a| a.resolved_at.is_some()).count() as i64,
            by_severity,
            period_hours: hours,
        })
    }
}
