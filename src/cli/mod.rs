//! CLI module for SheetCounter
//!
//! Provides command-line interface for:
//! - serve: counter service with cache and periodic refresh
//! - serve-legacy: uncached write/last-row service

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command, ServeArgs};
pub use commands::{load_config, run, run_command, serve, serve_legacy};
pub use config::ServiceConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
