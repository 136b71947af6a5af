//! # Counter Service
//!
//! Read-through last-row cache and the four table operations built on it.
//!
//! ## Concurrency
//! Increment and decrement are read-modify-write against a remote table.
//! Without `serialize_mutations`, two concurrent increments can read the
//! same last row and append the same value. With it, increment and
//! decrement run one at a time within this process.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{Mutex, MutexGuard};

use super::errors::{CounterError, CounterResult};
use super::last_row::{LastRow, LastRowView, FLAG_UNUSED, FLAG_USED};
use crate::cache::CounterCache;
use crate::observability::{Event, Logger};
use crate::sheets::{A1Range, Row, SheetBackend};

/// Column holding the counter value
pub const COUNTER_COLUMN: &str = "A";

/// Column holding the usage flag
pub const FLAG_COLUMN: &str = "B";

/// First and last column of the tracked table
pub const COUNTER_TABLE_COLUMNS: (&str, &str) = (COUNTER_COLUMN, FLAG_COLUMN);

/// Where the counter table lives and how mutations are coordinated
#[derive(Debug, Clone)]
pub struct CounterOptions {
    /// Sheet (tab) name, e.g. `Master`
    pub sheet_name: String,
    /// Numeric sheet id used by row deletion
    pub sheet_id: i64,
    /// Serialize increment/decrement within the process
    pub serialize_mutations: bool,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Master".to_string(),
            sheet_id: 0,
            serialize_mutations: false,
        }
    }
}

/// Counter operations over a two-column sheet
pub struct CounterService {
    backend: Arc<dyn SheetBackend>,
    cache: Arc<CounterCache>,
    table: A1Range,
    options: CounterOptions,
    mutation_gate: Mutex<()>,
}

impl CounterService {
    pub fn new(
        backend: Arc<dyn SheetBackend>,
        cache: Arc<CounterCache>,
        options: CounterOptions,
    ) -> CounterResult<Self> {
        let table = A1Range::columns(&options.sheet_name, COUNTER_COLUMN, FLAG_COLUMN)?;
        Ok(Self {
            backend,
            cache,
            table,
            options,
            mutation_gate: Mutex::new(()),
        })
    }

    /// The tracked range, e.g. `Master!A:B`
    pub fn table(&self) -> &A1Range {
        &self.table
    }

    /// Shared cache
    pub fn cache(&self) -> &Arc<CounterCache> {
        &self.cache
    }

    async fn gate(&self) -> Option<MutexGuard<'_, ()>> {
        if self.options.serialize_mutations {
            Some(self.mutation_gate.lock().await)
        } else {
            None
        }
    }

    /// Cached last row, reading the table on a miss.
    /// The empty state is returned but never cached.
    pub async fn get_last_row(&self) -> CounterResult<LastRow> {
        if let Some(cached) = self.cache.last_row.get() {
            return Ok(cached);
        }

        let rows = self.backend.read_range(&self.table).await?;
        let last = LastRow::from_rows(&rows);
        if last != LastRow::Empty {
            self.cache.last_row.set(last.clone());
        }
        Ok(last)
    }

    /// Drop the cached last row and read it again
    pub async fn refresh_last_row(&self) -> CounterResult<LastRow> {
        self.cache.last_row.invalidate();
        self.get_last_row().await
    }

    /// Append `[counter + 1, "FALSE"]`. Returns the appended counter value.
    pub async fn increment(&self) -> CounterResult<i64> {
        let _guard = self.gate().await;

        let last = self.get_last_row().await?;
        let next = last.base_counter()? + 1;

        self.backend
            .append_row(&self.table, vec![json!(next), json!(FLAG_UNUSED)])
            .await?;
        self.cache.last_row.invalidate();

        Logger::info(
            Event::RowAppended,
            &[("counter", next.to_string().as_str())],
        );
        Ok(next)
    }

    /// Delete the last row. Refuses empty and single-row tables.
    /// Returns the 1-based position of the deleted row.
    pub async fn decrement(&self) -> CounterResult<u64> {
        let _guard = self.gate().await;

        let row_count = match self.get_last_row().await? {
            LastRow::Present { row_count, .. } if row_count > 1 => row_count,
            other => {
                let count = other.row_count().unwrap_or(0).to_string();
                Logger::warn(Event::NothingToDelete, &[("row_count", count.as_str())]);
                return Err(CounterError::NothingToDelete);
            }
        };

        self.backend
            .delete_rows(self.options.sheet_id, row_count - 1, row_count)
            .await?;
        self.cache.last_row.invalidate();

        Logger::info(
            Event::RowDeleted,
            &[("row", row_count.to_string().as_str())],
        );
        Ok(row_count)
    }

    /// Write "TRUE" into the flag cell of 0-based row `number`.
    /// Neither reads nor invalidates the cache.
    pub async fn mark_used(&self, number: u64) -> CounterResult<()> {
        let cell = A1Range::cell(&self.options.sheet_name, FLAG_COLUMN, number + 1)?;
        self.backend
            .update_range(&cell, vec![vec![Value::from(FLAG_USED)]])
            .await?;

        Logger::info(
            Event::RowMarkedUsed,
            &[("cell", cell.to_string().as_str())],
        );
        Ok(())
    }

    /// Rows whose flag is exactly "FALSE".
    ///
    /// Served from the `all` entry, which mutations never invalidate, so a
    /// result can lag behind writes until the entry expires.
    pub async fn list_unused(&self) -> CounterResult<Vec<Row>> {
        if let Some(cached) = self.cache.unused.get() {
            return Ok(cached);
        }

        let rows = self.backend.read_range(&self.table).await?;
        let unused: Vec<Row> = rows
            .into_iter()
            .filter(|row| row.get(1).map(String::as_str) == Some(FLAG_UNUSED))
            .collect();

        self.cache.unused.set(unused.clone());
        Ok(unused)
    }

    /// Last row with single-row normalization; `None` when the table is empty
    pub async fn last_row_view(&self) -> CounterResult<Option<LastRowView>> {
        Ok(self.get_last_row().await?.view())
    }
}
