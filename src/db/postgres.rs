use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::db::{queries, AlertStore, DbPool};
use crate::error::AlertError;
use crate::models::alert::{ActiveAlert, AlertCandidate, AlertRecord};
use crate::models::severity::Severity;
use crate::models::summary::{AlertSummary, SeverityCount};

/// Postgres-backed alert store. Same-pair creators are serialized with an
/// advisory transaction lock: a sliding dedup window cannot be expressed as
/// a unique index, since two active rows for one pair are legal once the
/// window has lapsed.
pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<AlertRecord, sqlx::Error> {
    let severity: String = row.try_get("severity")?;
    let metadata: Json<Map<String, Value>> = row.try_get("metadata")?;

    Ok(AlertRecord {
        id: row.try_get("id")?,
        shipment_id: row.try_get("shipment_id")?,
        alert_type: row.try_get("alert_type")?,
        severity: Severity::parse(&severity).unwrap_or_default(),
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        metadata: metadata.0,
        triggered_at: row.try_get("triggered_at")?,
        is_active: row.try_get("is_active")?,
        resolved_at: row.try_get("resolved_at")?,
        resolved_by: row.try_get("resolved_by")?,
    })
}

fn active_alert_from_row(row: &PgRow) -> Result<ActiveAlert, sqlx::Error> {
    Ok(ActiveAlert {
        alert: record_from_row(row)?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        current_location: row.try_get("current_location")?,
        shipment_status: row.try_get("shipment_status")?,
    })
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn find_recent_duplicate(
        &self,
        shipment_id: &str,
        alert_type: &str,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError> {
        let cutoff = Utc::now() - window;
        let row = sqlx::query(queries::SELECT_RECENT_DUPLICATE)
            .bind(shipment_id)
            .bind(alert_type)
            .bind(cutoff)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    async fn insert(
        &self,
        candidate: AlertCandidate,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError> {
        let record = candidate.into_record(Uuid::new_v4());
        let mut tx = self.pool.begin().await?;

        // Serialize creators of the same pair for the rest of this
        // transaction; the re-probe below then sees any winner's commit.
        sqlx::query(queries::LOCK_ALERT_PAIR)
            .bind(&record.shipment_id)
            .bind(&record.alert_type)
            .execute(&mut *tx)
            .await?;

        let cutoff = Utc::now() - window;
        let duplicate = sqlx::query(queries::SELECT_RECENT_DUPLICATE)
            .bind(&record.shipment_id)
            .bind(&record.alert_type)
            .bind(cutoff)
            .fetch_optional(&mut *tx)
            .await?;

        if duplicate.is_some() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(queries::INSERT_ALERT)
            .bind(record.id)
            .bind(&record.shipment_id)
            .bind(&record.alert_type)
            .bind(record.severity.as_str())
            .bind(&record.title)
            .bind(&record.message)
            .bind(Json(&record.metadata))
            .bind(record.triggered_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(record))
    }

    async fn list_active(&self, limit: i64) -> Result<Vec<ActiveAlert>, AlertError> {
        let rows = sqlx::query(queries::SELECT_ACTIVE_ALERTS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let alerts = rows
            .iter()
            .map(active_alert_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(alerts)
    }

    async fn resolve(&self, id: Uuid, resolved_by: &str) -> Result<bool, AlertError> {
        let result = sqlx::query(queries::RESOLVE_ALERT)
            .bind(id)
            .bind(resolved_by)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn summarize(&self, hours: u32) -> Result<AlertSummary, AlertError> {
        let cutoff = Utc::now() - Duration::hours(i64::from(hours));

        let totals = sqlx::query(queries::SUMMARY_TOTALS)
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(queries::SUMMARY_BY_SEVERITY)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        let by_severity = rows
            .iter()
            .map(|row| {
                Ok(SeverityCount {
                    severity: row.try_get("severity")?,
                    count: row.try_get("count")?,
                    active_count: row.try_get("active_count")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(AlertSummary {
            total_alerts: totals.try_get("total_alerts")?,
            active_alerts: totals.try_get("active_alerts")?,
            resolved_alerts: totals.try_get("resolved_alerts")?,
            by_severity,
            period_hours: hours,
        })
    }
}
