//! # Sheet Backend Module
//!
//! Remote spreadsheet access: A1 addressing, the backend trait consumed by
//! the counter service, a Google Sheets v4 client with service-account
//! authentication, and an in-memory sheet.

pub mod auth;
pub mod backend;
pub mod errors;
pub mod google;
pub mod memory;
pub mod range;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, TokenProvider};
pub use backend::{Row, SheetBackend};
pub use errors::{SheetError, SheetResult};
pub use google::GoogleSheetsClient;
pub use memory::MemorySheet;
pub use range::A1Range;
