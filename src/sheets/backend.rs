//! # Sheet Backend
//!
//! The four operations the counter service consumes from a remote table.

use async_trait::async_trait;
use serde_json::Value;

use super::errors::SheetResult;
use super::range::A1Range;

/// One row of string cells as returned by a range read.
/// Trailing empty cells may be omitted by the remote service.
pub type Row = Vec<String>;

/// Key-range access to a remote spreadsheet
#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Read every non-empty row in `range`, in order
    async fn read_range(&self, range: &A1Range) -> SheetResult<Vec<Row>>;

    /// Append one row after the last non-empty row of `range`
    async fn append_row(&self, range: &A1Range, values: Vec<Value>) -> SheetResult<()>;

    /// Overwrite cells starting at the top-left of `range`
    async fn update_range(&self, range: &A1Range, values: Vec<Vec<Value>>) -> SheetResult<()>;

    /// Remove rows `[start_index, end_index)` (0-based) from the sheet with `sheet_id`
    async fn delete_rows(&self, sheet_id: i64, start_index: u64, end_index: u64)
        -> SheetResult<()>;
}

/// Text of a cell as returned by a values read.
/// Strings are kept verbatim; other JSON values are stringified.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
