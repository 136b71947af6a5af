//! Observability for the counter service
//!
//! Structured JSON logging with a closed set of typed events.
//!
//! ```ignore
//! use sheetcounter::observability::{Event, Logger};
//!
//! Logger::info(Event::RowAppended, &[("counter", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
