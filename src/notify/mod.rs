use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

use crate::error::NotifyError;
use crate::models::alert::AlertRecord;

pub mod console;
pub mod slack;

/// A notification target. Sinks are independent of each other; the
/// dispatcher isolates their failures.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError>;
}

/// Fans a persisted alert out to every configured sink. Delivery is
/// best-effort: a failed sink is logged with its own error and the rest
/// still run, so the caller's create path never sees notification trouble.
#[derive(Default)]
pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn AlertNotifier>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertNotifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub async fn dispatch(&self, alert: &AlertRecord) {
        let deliveries = self
            .sinks
            .iter()
            .map(|sink| async move { (sink.name(), sink.notify(alert).await) });

        for (name, result) in join_all(deliveries).await {
            if let Err(e) = result {
                warn!(
                    alert_id = %alert.id,
                    sink = name,
                    error = %e,
                    "Notification sink failed"
                );
            }
        }
    }
}
