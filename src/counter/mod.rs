//! # Counter Module
//!
//! Derives a counter from the last row of a two-column sheet and exposes
//! increment, decrement, usage marking and unused-row listing on top of a
//! read-through cache.

pub mod errors;
pub mod last_row;
pub mod service;

pub use errors::{CounterError, CounterResult};
pub use last_row::{CounterCell, LastRow, LastRowView, EMPTY_COUNTER, FLAG_UNUSED, FLAG_USED};
pub use service::{
    CounterOptions, CounterService, COUNTER_COLUMN, COUNTER_TABLE_COLUMNS, FLAG_COLUMN,
};
