//! # Counter Cache
//!
//! Explicit cache service shared by request handlers and the periodic
//! refresh task. Two named entries:
//!
//! - `lastRow`: the derived last-row triple, invalidated on append/delete
//! - `all`: the unused-row list, only ever expires

mod entry;

use std::time::Duration;

pub use entry::TtlEntry;

use crate::counter::LastRow;
use crate::sheets::Row;

/// Key of the last-row entry
pub const LAST_ROW_KEY: &str = "lastRow";

/// Key of the unused-row list entry
pub const UNUSED_KEY: &str = "all";

/// Default time-to-live for both entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Cache shared by the counter service
#[derive(Debug)]
pub struct CounterCache {
    pub last_row: TtlEntry<LastRow>,
    pub unused: TtlEntry<Vec<Row>>,
}

impl CounterCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            last_row: TtlEntry::new(LAST_ROW_KEY, ttl),
            unused: TtlEntry::new(UNUSED_KEY, ttl),
        }
    }
}

impl Default for CounterCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
