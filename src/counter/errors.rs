//! # Counter Errors

use thiserror::Error;

use crate::sheets::SheetError;

/// Result type for counter operations
pub type CounterResult<T> = Result<T, CounterError>;

/// Counter errors
#[derive(Debug, Clone, Error)]
pub enum CounterError {
    /// Decrement on an empty or single-row table
    #[error("No data to delete")]
    NothingToDelete,

    /// The stored counter cell cannot be read as an integer
    #[error("Counter value is not an integer: {0:?}")]
    InvalidCounter(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl CounterError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            CounterError::NothingToDelete => 404,
            CounterError::InvalidCounter(_) => 500,
            CounterError::Sheet(e) => e.status_code(),
        }
    }
}
