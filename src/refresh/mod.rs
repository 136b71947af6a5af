//! # Periodic Refresh
//!
//! Scheduled, no-argument refresh of the last-row cache entry.

pub mod errors;
pub mod scheduler;

pub use errors::{RefreshError, RefreshResult};
pub use scheduler::{RefreshScheduler, DEFAULT_REFRESH_CRON};
