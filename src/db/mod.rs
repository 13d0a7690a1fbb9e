use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AlertError;
use crate::models::alert::{ActiveAlert, AlertCandidate, AlertRecord};
use crate::models::summary::AlertSummary;

pub mod memory;
pub mod postgres;
pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Durable alert storage. Creation-side mutation goes through `insert`,
/// resolution through `resolve`; nothing here ever deletes a record.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Most recent active alert for the `(shipment_id, alert_type)` pair
    /// triggered inside the trailing `window`. No match is `None`, not an
    /// error.
    async fn find_recent_duplicate(
        &self,
        shipment_id: &str,
        alert_type: &str,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError>;

    /// Persists the candidate unless another active alert for the same pair
    /// landed inside `window`. The window probe and the write run under the
    /// store's own exclusion, so two racing creators cannot both insert;
    /// the loser gets `None`.
    async fn insert(
        &self,
        candidate: AlertCandidate,
        window: Duration,
    ) -> Result<Option<AlertRecord>, AlertError>;

    /// Active alerts, newest trigger first, joined with shipment context
    /// where the registry knows the shipment.
    async fn list_active(&self, limit: i64) -> Result<Vec<ActiveAlert>, AlertError>;

    /// Flips an active alert to resolved. Returns whether a row actually
    /// changed; a missing or already-resolved id is `false`, not an error.
    async fn resolve(&self, id: Uuid, resolved_by: &str) -> Result<bool, AlertError>;

    /// Counts for alerts triggered in the last `hours`, broken down by
    /// severity (Critical first).
    async fn summarize(&self, hours: u32) -> Result<AlertSummary, AlertError>;
}
