use serde::{Deserialize, Serialize};

/// Per-severity slice of a summary window. The severity is kept as the raw
/// stored label so rows written by older producers still get a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
    pub active_count: i64,
}

/// Aggregate view of the alerts triggered inside a trailing window.
/// `by_severity` is ordered Critical first, unknown labels last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: i64,
    pub active_alerts: i64,
    pub resolved_alerts: i64,
    pub by_severity: Vec<SeverityCount>,
    pub period_hours: u32,
}

impl AlertSummary {
    /// Zeroed summary for a window, used when the store is unavailable and
    /// the caller runs fail-open.
    pub fn empty(period_hours: u32) -> Self {
        Self {
            period_hours,
            ..Self::default()
        }
    }
}
