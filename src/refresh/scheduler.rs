//! # Refresh Scheduler
//!
//! Forces a re-read of the last row on a cron schedule, independent of
//! request handling. Shares the counter cache without coordination.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio::task::JoinHandle;

use super::errors::{RefreshError, RefreshResult};
use crate::counter::CounterService;
use crate::observability::{Event, Logger};

/// Every minute
pub const DEFAULT_REFRESH_CRON: &str = "*/1 * * * *";

/// Cron-driven last-row refresh
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    pattern: String,
    cron: Cron,
}

impl RefreshScheduler {
    /// Parse a 5-field cron expression
    pub fn new(pattern: &str) -> RefreshResult<Self> {
        let cron = Cron::new(pattern)
            .parse()
            .map_err(|e| RefreshError::InvalidCron(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            cron,
        })
    }

    /// Cron expression
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// First occurrence strictly after `now`
    pub fn next_after(&self, now: &DateTime<Utc>) -> RefreshResult<DateTime<Utc>> {
        self.cron
            .find_next_occurrence(now, false)
            .map_err(|_| RefreshError::NoOccurrence(self.pattern.clone()))
    }

    /// Run one refresh. Failures are logged and swallowed so the loop keeps going.
    pub async fn tick(service: &CounterService) {
        Logger::trace(Event::RefreshTick, &[]);
        if let Err(e) = service.refresh_last_row().await {
            Logger::warn(Event::RefreshFailed, &[("error", e.to_string().as_str())]);
        }
    }

    /// Spawn the refresh loop. Abort the returned handle to stop it.
    pub fn spawn(self, service: Arc<CounterService>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = match self.next_after(&now) {
                    Ok(next) => next,
                    Err(e) => {
                        Logger::error(Event::SchedulerStopped, &[("error", e.to_string().as_str())]);
                        return;
                    }
                };

                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                tokio::time::sleep(wait).await;
                Self::tick(&service).await;
            }
        })
    }
}
