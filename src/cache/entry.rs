//! # TTL Entry
//!
//! A single named cache slot holding one value and its expiry instant.
//! Uses `tokio::time::Instant` so paused test clocks drive expiry.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::observability::{Event, Logger};

#[derive(Debug, Clone)]
struct Stored<V> {
    value: V,
    expires_at: Instant,
}

/// A named value with a fixed time-to-live
#[derive(Debug)]
pub struct TtlEntry<V> {
    key: &'static str,
    ttl: Duration,
    slot: Mutex<Option<Stored<V>>>,
}

impl<V: Clone> TtlEntry<V> {
    /// Create an empty entry
    pub fn new(key: &'static str, ttl: Duration) -> Self {
        Self {
            key,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cache key name
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Time-to-live applied on every `set`
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Option<Stored<V>>> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Get the value if present and not expired. Expired values are dropped.
    pub fn get(&self) -> Option<V> {
        let mut slot = self.lock();
        let now = Instant::now();

        match slot.as_ref() {
            Some(stored) if stored.expires_at > now => {
                Logger::trace(Event::CacheHit, &[("key", self.key)]);
                Some(stored.value.clone())
            }
            Some(_) => {
                *slot = None;
                Logger::trace(Event::CacheMiss, &[("key", self.key), ("reason", "expired")]);
                None
            }
            None => {
                Logger::trace(Event::CacheMiss, &[("key", self.key), ("reason", "absent")]);
                None
            }
        }
    }

    /// Store `value`, expiring `ttl` from now
    pub fn set(&self, value: V) {
        *self.lock() = Some(Stored {
            value,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Remove the value. Returns whether one was present.
    pub fn invalidate(&self) -> bool {
        let removed = self.lock().take().is_some();
        Logger::trace(
            Event::CacheInvalidate,
            &[("key", self.key), ("removed", if removed { "true" } else { "false" })],
        );
        removed
    }

    /// Instant at which the current value expires
    pub fn expires_at(&self) -> Option<Instant> {
        self.lock().as_ref().map(|s| s.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_value_expires_after_ttl() {
        let entry = TtlEntry::new("k", Duration::from_secs(60));
        entry.set(5u32);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(entry.get(), Some(5));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(entry.get(), None);
        assert!(entry.expires_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_restarts_ttl() {
        let entry = TtlEntry::new("k", Duration::from_secs(60));
        entry.set(1u32);
        tokio::time::advance(Duration::from_secs(45)).await;
        entry.set(2u32);
        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(entry.get(), Some(2));
    }

    #[test]
    fn test_invalidate() {
        let entry = TtlEntry::new("lastRow", Duration::from_secs(60));
        assert!(!entry.invalidate());
        entry.set("x".to_string());
        assert!(entry.invalidate());
        assert_eq!(entry.get(), None);
        assert_eq!(entry.key(), "lastRow");
    }
}
