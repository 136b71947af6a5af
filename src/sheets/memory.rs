//! # In-Memory Sheet
//!
//! A single-sheet grid that behaves like the remote service for the
//! operations in [`SheetBackend`]. Used by tests and by `--in-memory` mode.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::backend::{Row, SheetBackend};
use super::errors::{SheetError, SheetResult};
use super::range::A1Range;

/// In-memory sheet
#[derive(Debug)]
pub struct MemorySheet {
    sheet_name: String,
    sheet_id: i64,
    grid: Mutex<Vec<Row>>,
    reads: AtomicUsize,
    latency: Option<Duration>,
    fail_with: Mutex<Option<SheetError>>,
}

impl MemorySheet {
    /// Create an empty sheet
    pub fn new(sheet_name: impl Into<String>, sheet_id: i64) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            sheet_id,
            grid: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            latency: None,
            fail_with: Mutex::new(None),
        }
    }

    /// Create a sheet pre-populated with `rows`
    pub fn with_rows(sheet_name: impl Into<String>, sheet_id: i64, rows: Vec<Row>) -> Self {
        let sheet = Self::new(sheet_name, sheet_id);
        *sheet.lock() = rows;
        sheet
    }

    /// Delay every call by `latency` (simulates a remote round trip)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with `error` until cleared
    pub fn fail_next_calls(&self, error: Option<SheetError>) {
        *self.fail_with.lock().unwrap_or_else(|p| p.into_inner()) = error;
    }

    /// Number of `read_range` calls served
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Snapshot of the grid
    pub fn rows(&self) -> Vec<Row> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Row>> {
        self.grid.lock().unwrap_or_else(|p| p.into_inner())
    }

    async fn simulate_call(&self, range: Option<&A1Range>) -> SheetResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = self
            .fail_with
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
        {
            return Err(err);
        }
        if let Some(range) = range {
            if range.sheet() != self.sheet_name {
                return Err(SheetError::Api {
                    status: 400,
                    message: format!("Unable to parse range: {}", range),
                });
            }
        }
        Ok(())
    }
}

/// Render a written cell the way the sheet stores it after `USER_ENTERED`
/// parsing: booleans and boolean-like text become `TRUE`/`FALSE`.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => match s.to_ascii_uppercase().as_str() {
            "TRUE" | "FALSE" => s.to_ascii_uppercase(),
            _ => s.clone(),
        },
        other => other.to_string(),
    }
}

fn trim_row(mut row: Row) -> Row {
    while row.last().map(|c| c.is_empty()).unwrap_or(false) {
        row.pop();
    }
    row
}

fn set_cell(grid: &mut Vec<Row>, row: usize, column: usize, value: String) {
    if grid.len() <= row {
        grid.resize(row + 1, Vec::new());
    }
    let cells = &mut grid[row];
    if cells.len() <= column {
        cells.resize(column + 1, String::new());
    }
    cells[column] = value;
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn read_range(&self, range: &A1Range) -> SheetResult<Vec<Row>> {
        self.simulate_call(Some(range)).await?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let first_col = range.start().column;
        let last_col = range.last_column();
        let first_row = range.start().row.unwrap_or(1) as usize - 1;
        let grid = self.lock();
        let last_row = range
            .end()
            .and_then(|e| e.row)
            .map(|r| r as usize)
            .unwrap_or(grid.len())
            .min(grid.len());

        let mut rows: Vec<Row> = grid
            .iter()
            .take(last_row)
            .skip(first_row)
            .map(|cells| {
                trim_row(
                    (first_col..=last_col)
                        .map(|c| cells.get(c).cloned().unwrap_or_default())
                        .collect(),
                )
            })
            .collect();

        while rows.last().map(|r| r.is_empty()).unwrap_or(false) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_row(&self, range: &A1Range, values: Vec<Value>) -> SheetResult<()> {
        self.simulate_call(Some(range)).await?;
        let mut grid = self.lock();
        let first_col = range.start().column;
        let last_col = range.last_column();

        // The table ends at the last row with any content in the range's columns
        let target = grid
            .iter()
            .rposition(|cells| (first_col..=last_col).any(|c| cells.get(c).is_some_and(|v| !v.is_empty())))
            .map(|i| i + 1)
            .unwrap_or(0);

        for (offset, value) in values.iter().enumerate() {
            set_cell(&mut grid, target, first_col + offset, display_value(value));
        }
        Ok(())
    }

    async fn update_range(&self, range: &A1Range, values: Vec<Vec<Value>>) -> SheetResult<()> {
        self.simulate_call(Some(range)).await?;
        let mut grid = self.lock();
        let first_row = range.start().row.unwrap_or(1) as usize - 1;
        let first_col = range.start().column;

        for (r, row) in values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                set_cell(&mut grid, first_row + r, first_col + c, display_value(value));
            }
        }
        Ok(())
    }

    async fn delete_rows(
        &self,
        sheet_id: i64,
        start_index: u64,
        end_index: u64,
    ) -> SheetResult<()> {
        self.simulate_call(None).await?;
        if sheet_id != self.sheet_id {
            return Err(SheetError::Api {
                status: 400,
                message: format!("No grid with id: {}", sheet_id),
            });
        }
        if end_index <= start_index {
            return Err(SheetError::Api {
                status: 400,
                message: "Invalid requests[0].deleteDimension: empty range".to_string(),
            });
        }

        let mut grid = self.lock();
        let start = (start_index as usize).min(grid.len());
        let end = (end_index as usize).min(grid.len());
        grid.drain(start..end);
        Ok(())
    }
}
