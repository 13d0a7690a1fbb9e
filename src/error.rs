use thiserror::Error;

/// Store-facing failures. Storage faults stay distinguishable from the
/// "nothing configured" degrade path; everything else in the alert flow is
/// expressed as a boolean or empty-collection outcome, not an error.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert store is not configured")]
    StoreNotConfigured,

    #[error("storage fault: {0}")]
    Storage(#[from] sqlx::Error),
}

/// A notification sink failed to deliver. Never escalated past the
/// dispatcher; carried here so the log line can name the cause.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("channel request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("channel rejected message: {0}")]
    Channel(String),
}
