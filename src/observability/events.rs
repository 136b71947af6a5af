//! Observable events for the counter service
//!
//! Every log line names one of these events. Events are explicit and typed
//! so that log consumers can match on a closed set of names.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// HTTP listener bound, ready to serve
    ServerStart,
    /// HTTP server stopped
    ServerStop,

    // Cache
    /// Cache entry served
    CacheHit,
    /// Cache entry absent or expired
    CacheMiss,
    /// Cache entry explicitly removed
    CacheInvalidate,

    // Counter operations
    /// Counter row appended
    RowAppended,
    /// Counter row deleted
    RowDeleted,
    /// Usage flag written
    RowMarkedUsed,
    /// Decrement refused, nothing to delete
    NothingToDelete,
    /// Request answered with a server error
    RequestFailed,

    // Backend
    /// Remote range read
    BackendRead,
    /// Remote call failed
    BackendError,
    /// Access token refreshed
    TokenRefreshed,

    // Scheduler
    /// Periodic refresh started
    RefreshTick,
    /// Periodic refresh failed
    RefreshFailed,
    /// Scheduler stopped
    SchedulerStopped,
}

impl Event {
    /// Returns the event name as emitted in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::CacheHit => "CACHE_HIT",
            Event::CacheMiss => "CACHE_MISS",
            Event::CacheInvalidate => "CACHE_INVALIDATE",
            Event::RowAppended => "ROW_APPENDED",
            Event::RowDeleted => "ROW_DELETED",
            Event::RowMarkedUsed => "ROW_MARKED_USED",
            Event::NothingToDelete => "NOTHING_TO_DELETE",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::BackendRead => "BACKEND_READ",
            Event::BackendError => "BACKEND_ERROR",
            Event::TokenRefreshed => "TOKEN_REFRESHED",
            Event::RefreshTick => "REFRESH_TICK",
            Event::RefreshFailed => "REFRESH_FAILED",
            Event::SchedulerStopped => "SCHEDULER_STOPPED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        for event in [
            Event::ConfigLoaded,
            Event::CacheMiss,
            Event::NothingToDelete,
            Event::SchedulerStopped,
        ] {
            let name = event.as_str();
            assert!(name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(Event::RowAppended.to_string(), "ROW_APPENDED");
    }
}
