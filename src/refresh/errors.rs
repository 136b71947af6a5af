//! # Refresh Errors

use thiserror::Error;

/// Result type for refresh scheduling
pub type RefreshResult<T> = Result<T, RefreshError>;

/// Refresh scheduling errors
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),

    #[error("No upcoming occurrence for cron expression: {0}")]
    NoOccurrence(String),
}
