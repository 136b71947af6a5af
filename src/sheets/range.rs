//! # A1 Ranges
//!
//! Addresses into a sheet in A1 notation, e.g. `Master!A:B` (whole columns)
//! or `Master!B7` (single cell). Rows are 1-based, columns are letters.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{SheetError, SheetResult};

/// One corner of a range: a column and an optional 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// 0-based column index (A = 0)
    pub column: usize,
    /// 1-based row, `None` for an open column reference
    pub row: Option<u64>,
}

/// A range within a named sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    sheet: String,
    start: CellRef,
    end: Option<CellRef>,
}

fn a1_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:'([^']+)'|([^'!]+))!([A-Z]+)([0-9]*)(?::([A-Z]+)([0-9]*))?$")
            .expect("A1 pattern is a valid regex")
    })
}

impl A1Range {
    /// Whole-column span, e.g. `columns("Master", "A", "B")` is `Master!A:B`
    pub fn columns(sheet: &str, first: &str, last: &str) -> SheetResult<Self> {
        Self::parse(&format!("{}!{}:{}", quote_sheet(sheet), first, last))
    }

    /// Single cell, e.g. `cell("Master", "B", 3)` is `Master!B3`
    pub fn cell(sheet: &str, column: &str, row: u64) -> SheetResult<Self> {
        Self::parse(&format!("{}!{}{}", quote_sheet(sheet), column, row))
    }

    /// Parse an A1 range
    pub fn parse(s: &str) -> SheetResult<Self> {
        let caps = a1_pattern()
            .captures(s)
            .ok_or_else(|| SheetError::InvalidRange(s.to_string()))?;

        let sheet = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SheetError::InvalidRange(s.to_string()))?;

        let start = CellRef {
            column: column_index(&caps[3]),
            row: parse_row(caps.get(4).map(|m| m.as_str()), s)?,
        };

        let end = match caps.get(5) {
            Some(col) => Some(CellRef {
                column: column_index(col.as_str()),
                row: parse_row(caps.get(6).map(|m| m.as_str()), s)?,
            }),
            None => None,
        };

        if let Some(end) = end {
            if end.column < start.column {
                return Err(SheetError::InvalidRange(s.to_string()));
            }
        }

        Ok(Self { sheet, start, end })
    }

    /// Sheet (tab) name
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Top-left corner
    pub fn start(&self) -> CellRef {
        self.start
    }

    /// Bottom-right corner, `None` for a single cell
    pub fn end(&self) -> Option<CellRef> {
        self.end
    }

    /// Last column covered by this range
    pub fn last_column(&self) -> usize {
        self.end.map(|e| e.column).unwrap_or(self.start.column)
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!", quote_sheet(&self.sheet))?;
        write_ref(f, self.start)?;
        if let Some(end) = self.end {
            write!(f, ":")?;
            write_ref(f, end)?;
        }
        Ok(())
    }
}

fn write_ref(f: &mut fmt::Formatter<'_>, cell: CellRef) -> fmt::Result {
    write!(f, "{}", column_name(cell.column))?;
    if let Some(row) = cell.row {
        write!(f, "{}", row)?;
    }
    Ok(())
}

fn quote_sheet(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet)
    }
}

fn parse_row(digits: Option<&str>, original: &str) -> SheetResult<Option<u64>> {
    match digits {
        None | Some("") => Ok(None),
        Some(d) => match d.parse::<u64>() {
            Ok(0) | Err(_) => Err(SheetError::InvalidRange(original.to_string())),
            Ok(row) => Ok(Some(row)),
        },
    }
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26
pub fn column_index(letters: &str) -> usize {
    letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1)
        - 1
}

/// 0 -> `A`, 25 -> `Z`, 26 -> `AA`
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}
