//! # Last Row
//!
//! The final row of the tracked range, interpreted as
//! `[counterValue, usedFlag, rowCount]`.
//!
//! When the table holds exactly one row, its counter is treated as 0 for
//! display and for increment, whatever the cell actually contains.
//! Decrement does not apply this rule; it refuses single-row tables instead.

use serde::ser::{Serialize, SerializeTuple, Serializer};

use super::errors::{CounterError, CounterResult};
use crate::sheets::Row;

/// Counter value reported for an empty table
pub const EMPTY_COUNTER: i64 = -1;

/// Usage flag of a row that has not been consumed
pub const FLAG_UNUSED: &str = "FALSE";

/// Usage flag of a consumed row
pub const FLAG_USED: &str = "TRUE";

/// Derived last-row state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastRow {
    /// The tracked range holds no rows
    Empty,

    /// The final row and the number of rows above and including it
    Present {
        counter: String,
        used: String,
        row_count: u64,
    },
}

impl LastRow {
    /// Derive from a full range read
    pub fn from_rows(rows: &[Row]) -> Self {
        match rows.last() {
            None => LastRow::Empty,
            Some(last) => LastRow::Present {
                counter: last.first().cloned().unwrap_or_default(),
                used: last.get(1).cloned().unwrap_or_default(),
                row_count: rows.len() as u64,
            },
        }
    }

    /// 1-based row count, `None` when empty
    pub fn row_count(&self) -> Option<u64> {
        match self {
            LastRow::Empty => None,
            LastRow::Present { row_count, .. } => Some(*row_count),
        }
    }

    /// Counter value used to compute the next increment.
    ///
    /// Empty tables yield -1 and single-row tables yield 0.
    pub fn base_counter(&self) -> CounterResult<i64> {
        match self {
            LastRow::Empty => Ok(EMPTY_COUNTER),
            LastRow::Present { row_count: 1, .. } => Ok(0),
            LastRow::Present { counter, .. } => parse_counter(counter),
        }
    }

    /// Public view; `None` when the table is empty
    pub fn view(&self) -> Option<LastRowView> {
        match self {
            LastRow::Empty => None,
            LastRow::Present {
                counter,
                used,
                row_count,
            } => Some(LastRowView {
                counter: if *row_count == 1 {
                    CounterCell::Zero
                } else {
                    CounterCell::Stored(counter.clone())
                },
                used: used.clone(),
                row_count: *row_count,
            }),
        }
    }
}

/// Empty cells count as 0, surrounding whitespace is ignored
fn parse_counter(raw: &str) -> CounterResult<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| CounterError::InvalidCounter(raw.to_string()))
}

/// The counter position of a [`LastRowView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterCell {
    /// Cell text as stored in the sheet
    Stored(String),
    /// Single-row normalization, serialized as the number 0
    Zero,
}

impl Serialize for CounterCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CounterCell::Stored(s) => serializer.serialize_str(s),
            CounterCell::Zero => serializer.serialize_i64(0),
        }
    }
}

/// `[counter, flag, rowCount]` as returned by `GET /last-row`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRowView {
    pub counter: CounterCell,
    pub used: String,
    pub row_count: u64,
}

impl Serialize for LastRowView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.counter)?;
        tuple.serialize_element(&self.used)?;
        tuple.serialize_element(&self.row_count)?;
        tuple.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: &[(&str, &str)]) -> Vec<Row> {
        values
            .iter()
            .map(|(a, b)| vec![a.to_string(), b.to_string()])
            .collect()
    }

    #[test]
    fn test_empty_table() {
        let last = LastRow::from_rows(&[]);
        assert_eq!(last, LastRow::Empty);
        assert_eq!(last.base_counter().unwrap(), EMPTY_COUNTER);
        assert!(last.view().is_none());
        assert!(last.row_count().is_none());
    }

    #[test]
    fn test_takes_final_row_and_count() {
        let last = LastRow::from_rows(&rows(&[("0", "TRUE"), ("1", "FALSE"), ("2", "FALSE")]));
        assert_eq!(
            last,
            LastRow::Present {
                counter: "2".into(),
                used: "FALSE".into(),
                row_count: 3
            }
        );
        assert_eq!(last.base_counter().unwrap(), 2);
    }

    #[test]
    fn test_single_row_normalizes_to_zero() {
        let last = LastRow::from_rows(&rows(&[("17", "TRUE")]));
        assert_eq!(last.base_counter().unwrap(), 0);

        let view = last.view().unwrap();
        assert_eq!(view.counter, CounterCell::Zero);
        assert_eq!(serde_json::to_value(&view).unwrap(), json!([0, "TRUE", 1]));
    }

    #[test]
    fn test_view_serializes_as_triple() {
        let last = LastRow::from_rows(&rows(&[("0", "TRUE"), ("5", "FALSE")]));
        assert_eq!(
            serde_json::to_value(last.view().unwrap()).unwrap(),
            json!(["5", "FALSE", 2])
        );
    }

    #[test]
    fn test_short_row_reads_missing_flag_as_empty() {
        let last = LastRow::from_rows(&[vec!["0".to_string()], vec!["1".to_string()]]);
        assert_eq!(
            last,
            LastRow::Present {
                counter: "1".into(),
                used: String::new(),
                row_count: 2
            }
        );
    }

    #[test]
    fn test_non_numeric_counter() {
        let last = LastRow::from_rows(&rows(&[("0", "FALSE"), ("abc", "FALSE")]));
        assert!(matches!(
            last.base_counter(),
            Err(CounterError::InvalidCounter(v)) if v == "abc"
        ));
    }

    #[test]
    fn test_blank_counter_counts_as_zero() {
        let last = LastRow::from_rows(&rows(&[("0", "FALSE"), (" ", "FALSE")]));
        assert_eq!(last.base_counter().unwrap(), 0);
    }
}
