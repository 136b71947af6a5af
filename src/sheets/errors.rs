//! # Sheet Backend Errors

use thiserror::Error;

/// Result type for sheet backend operations
pub type SheetResult<T> = Result<T, SheetError>;

/// Sheet backend errors
#[derive(Debug, Clone, Error)]
pub enum SheetError {
    /// Request never produced a response (DNS, TLS, timeout)
    #[error("Network error: {0}")]
    Transport(String),

    /// Remote service answered with a non-success status.
    /// The remote message is surfaced verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl SheetError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            SheetError::InvalidRange(_) => 400,
            SheetError::Transport(_)
            | SheetError::Api { .. }
            | SheetError::Auth(_)
            | SheetError::MalformedResponse(_) => 500,
        }
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SheetError::MalformedResponse(e.to_string())
        } else {
            SheetError::Transport(e.to_string())
        }
    }
}
