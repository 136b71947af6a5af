//! sheetcounter - a cached counter service backed by a spreadsheet range
//!
//! The counter lives in a two-column sheet (`value`, `used`). The last row is
//! read through a short-lived cache; increment appends, decrement deletes,
//! and rows can be marked as consumed.

pub mod cache;
pub mod cli;
pub mod counter;
pub mod http_server;
pub mod observability;
pub mod refresh;
pub mod sheets;
