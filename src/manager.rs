use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::AlertStore;
use crate::error::AlertError;
use crate::models::alert::{ActiveAlert, AlertCandidate};
use crate::models::summary::AlertSummary;
use crate::notify::NotificationDispatcher;

pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 3600;
pub const DEFAULT_ACTIVE_LIMIT: i64 = 50;
pub const DEFAULT_SUMMARY_HOURS: u32 = 24;
pub const DEFAULT_RESOLVER: &str = "system";

/// Orchestrates alert creation, listing, resolution, and summarizing over
/// the store and the notification sinks.
///
/// In fail-open mode (the default) storage trouble degrades to the benign
/// outcome of each operation — `false`, an empty list, a zeroed summary —
/// so an upstream pipeline is never blocked by alerting. Fail-closed
/// surfaces the `AlertError` instead.
pub struct AlertManager {
    store: Option<Arc<dyn AlertStore>>,
    dispatcher: NotificationDispatcher,
    dedup_window: Duration,
    fail_open: bool,
}

impl AlertManager {
    pub fn new(store: Option<Arc<dyn AlertStore>>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            store,
            dispatcher,
            dedup_window: Duration::seconds(DEFAULT_DEDUP_WINDOW_SECS),
            fail_open: true,
        }
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    fn store(&self) -> Result<&Arc<dyn AlertStore>, AlertError> {
        self.store.as_ref().ok_or(AlertError::StoreNotConfigured)
    }

    /// Creates an alert unless a recent duplicate exists. Returns whether a
    /// new alert was persisted; a suppressed duplicate is `false`, not an
    /// error. Notification runs after the write and never affects the
    /// outcome.
    pub async fn create_alert(&self, candidate: AlertCandidate) -> Result<bool, AlertError> {
        match self.try_create(candidate).await {
            Ok(created) => Ok(created),
            Err(e) if self.fail_open => {
                warn!(error = %e, "Alert creation degraded to no-op");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn try_create(&self, candidate: AlertCandidate) -> Result<bool, AlertError> {
        let store = self.store()?;

        if let Some(existing) = store
            .find_recent_duplicate(&candidate.shipment_id, &candidate.alert_type, self.dedup_window)
            .await?
        {
            debug!(
                shipment_id = %candidate.shipment_id,
                alert_type = %candidate.alert_type,
                existing_id = %existing.id,
                "Duplicate alert suppressed"
            );
            return Ok(false);
        }

        // The store re-probes the window under its own exclusion, so a
        // racing creator that slipped past the check above still collapses
        // into the suppressed path here.
        let Some(record) = store.insert(candidate, self.dedup_window).await? else {
            return Ok(false);
        };

        info!(
            alert_id = %record.id,
            shipment_id = %record.shipment_id,
            severity = record.severity.as_str(),
            "Created alert"
        );

        self.dispatcher.dispatch(&record).await;

        Ok(true)
    }

    /// Active alerts with shipment context, newest first.
    pub async fn get_active_alerts(&self, limit: i64) -> Result<Vec<ActiveAlert>, AlertError> {
        let result = match self.store() {
            Ok(store) => store.list_active(limit).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(alerts) => Ok(alerts),
            Err(e) if self.fail_open => {
                warn!(error = %e, "Listing active alerts failed, returning none");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves an active alert. `false` means not found or already
    /// resolved; resolution never re-notifies.
    pub async fn resolve_alert(&self, id: Uuid, resolved_by: &str) -> Result<bool, AlertError> {
        let result = match self.store() {
            Ok(store) => store.resolve(id, resolved_by).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                info!(alert_id = %id, resolved_by = resolved_by, "Resolved alert");
                Ok(true)
            }
            Ok(false) => {
                debug!(alert_id = %id, "Alert not found or already resolved");
                Ok(false)
            }
            Err(e) if self.fail_open => {
                warn!(alert_id = %id, error = %e, "Alert resolution failed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Summary of alerts triggered in the trailing `hours`.
    pub async fn get_alert_summary(&self, hours: u32) -> Result<AlertSummary, AlertError> {
        let result = match self.store() {
            Ok(store) => store.summarize(hours).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => Ok(summary),
            Err(e) if self.fail_open => {
                warn!(error = %e, "Alert summary failed, returning empty");
                Ok(AlertSummary::empty(hours))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryAlertStore;
    use crate::error::NotifyError;
    use crate::models::alert::AlertRecord;
    use crate::models::severity::Severity;
    use crate::notify::AlertNotifier;
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::Mutex;

    struct RecordingSink {
        seen: Mutex<Vec<AlertRecord>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AlertNotifier for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AlertNotifier for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn notify(&self, _alert: &AlertRecord) -> Result<(), NotifyError> {
            Err(NotifyError::Channel("rate_limited".to_string()))
        }
    }

    fn delay_candidate() -> AlertCandidate {
        let mut metadata = Map::new();
        metadata.insert("delay_probability".to_string(), json!(0.82));
        metadata.insert("estimated_delay_minutes".to_string(), json!(95));

        AlertCandidate {
            shipment_id: "SH001".to_string(),
            alert_type: "delay_prediction".to_string(),
            severity: Severity::High,
            title: "Delay Risk".to_string(),
            message: "ETA slipping".to_string(),
            metadata,
            triggered_at: None,
        }
    }

    fn manager_with(
        store: Arc<MemoryAlertStore>,
        dispatcher: NotificationDispatcher,
    ) -> AlertManager {
        AlertManager::new(Some(store), dispatcher)
    }

    #[tokio::test]
    async fn test_create_persists_and_notifies_once() {
        let store = Arc::new(MemoryAlertStore::new());
        let sink = RecordingSink::new();
        let manager = manager_with(
            store.clone(),
            NotificationDispatcher::new().with_sink(sink.clone()),
        );

        let created = manager.create_alert(delay_candidate()).await.unwrap();
        assert!(created);

        let listed = manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].alert.is_active);
        assert_eq!(listed[0].alert.shipment_id, "SH001");

        // The same candidate inside the window is suppressed without a
        // second notification.
        let repeat = manager.create_alert(delay_candidate()).await.unwrap();
        assert!(!repeat);
        assert_eq!(sink.count(), 1);
        assert_eq!(manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_never_fails_create() {
        let store = Arc::new(MemoryAlertStore::new());
        let sink = RecordingSink::new();
        let manager = manager_with(
            store.clone(),
            NotificationDispatcher::new()
                .with_sink(Arc::new(FailingSink))
                .with_sink(sink.clone()),
        );

        let created = manager.create_alert(delay_candidate()).await.unwrap();
        assert!(created);
        assert_eq!(sink.count(), 1);
        assert_eq!(store.list_active(50).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_open() {
        let manager = AlertManager::new(None, NotificationDispatcher::new());

        assert!(!manager.create_alert(delay_candidate()).await.unwrap());
        assert!(manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await.unwrap().is_empty());
        assert!(!manager.resolve_alert(Uuid::new_v4(), DEFAULT_RESOLVER).await.unwrap());

        let summary = manager.get_alert_summary(DEFAULT_SUMMARY_HOURS).await.unwrap();
        assert_eq!(summary.total_alerts, 0);
        assert_eq!(summary.period_hours, DEFAULT_SUMMARY_HOURS);
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_closed_when_asked() {
        let manager =
            AlertManager::new(None, NotificationDispatcher::new()).with_fail_open(false);

        let result = manager.create_alert(delay_candidate()).await;
        assert!(matches!(result, Err(AlertError::StoreNotConfigured)));

        let result = manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await;
        assert!(matches!(result, Err(AlertError::StoreNotConfigured)));
    }

    #[tokio::test]
    async fn test_resolution_round_trip() {
        let store = Arc::new(MemoryAlertStore::new());
        let manager = manager_with(store, NotificationDispatcher::new());

        manager.create_alert(delay_candidate()).await.unwrap();
        let id = manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await.unwrap()[0].alert.id;

        assert!(manager.resolve_alert(id, "ops").await.unwrap());
        assert!(!manager.resolve_alert(id, "ops").await.unwrap());
        assert!(manager.get_active_alerts(DEFAULT_ACTIVE_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shorter_window_allows_recurrence() {
        let store = Arc::new(MemoryAlertStore::new());
        let manager = manager_with(store, NotificationDispatcher::new())
            .with_dedup_window(Duration::zero());

        assert!(manager.create_alert(delay_candidate()).await.unwrap());
        assert!(manager.create_alert(delay_candidate()).await.unwrap());
    }
}
