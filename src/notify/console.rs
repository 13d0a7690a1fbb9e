use async_trait::async_trait;
use tracing::info;

use crate::error::NotifyError;
use crate::models::alert::AlertRecord;
use crate::notify::AlertNotifier;

/// Always-on sink writing alerts to the service log.
pub struct ConsoleNotifier;

#[async_trait]
impl AlertNotifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
        info!(
            severity = alert.severity.as_str(),
            shipment_id = %alert.shipment_id,
            alert_type = %alert.alert_type,
            triggered_at = %alert.triggered_at.format("%Y-%m-%d %H:%M:%S"),
            "ALERT {}: {}",
            alert.title,
            alert.message
        );
        Ok(())
    }
}
