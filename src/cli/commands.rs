//! CLI command implementations
//!
//! Both commands follow the same boot sequence:
//! 1. Configuration load (file, then environment)
//! 2. Logger setup
//! 3. Backend construction
//! 4. Service and server wiring
//! 5. Serve until Ctrl-C

use std::sync::Arc;

use super::args::{Command, ServeArgs};
use super::config::ServiceConfig;
use super::errors::{CliError, CliResult};
use crate::cache::CounterCache;
use crate::counter::CounterService;
use crate::http_server::HttpServer;
use crate::observability::{Event, Logger};
use crate::refresh::RefreshScheduler;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve(args) => serve(&args),
        Command::ServeLegacy(args) => serve_legacy(&args),
    }
}

/// Load configuration and apply command-line overrides
pub fn load_config(args: &ServeArgs) -> CliResult<ServiceConfig> {
    let config = resolve_config(args, |key| std::env::var(key).ok())?;

    if let Some(severity) = config.severity() {
        Logger::set_min_severity(severity);
    }
    Logger::info(
        Event::ConfigLoaded,
        &[
            ("backend", if args.in_memory { "memory" } else { "sheets" }),
            ("port", config.server.port.to_string().as_str()),
            ("table", config.table()?.to_string().as_str()),
        ],
    );
    Ok(config)
}

/// File, then environment through `lookup`, then command-line flags
fn resolve_config<F>(args: &ServeArgs, lookup: F) -> CliResult<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServiceConfig::load_with(args.config.as_deref(), lookup)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Start the counter service with its periodic refresh task
pub fn serve(args: &ServeArgs) -> CliResult<()> {
    let config = load_config(args)?;
    let scheduler = RefreshScheduler::new(&config.refresh_cron)?;
    let rt = runtime()?;

    rt.block_on(async {
        let backend = config.build_backend(args.in_memory)?;
        let cache = Arc::new(CounterCache::new(config.cache_ttl()));
        let service = Arc::new(CounterService::new(
            backend,
            cache,
            config.counter_options(),
        )?);

        let refresh = scheduler.spawn(service.clone());
        let result = HttpServer::counter(config.server.clone(), service)
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)));
        refresh.abort();
        result
    })
}

/// Start the legacy service; no cache, no refresh
pub fn serve_legacy(args: &ServeArgs) -> CliResult<()> {
    let config = load_config(args)?;
    let rt = runtime()?;

    rt.block_on(async {
        let backend = config.build_backend(args.in_memory)?;
        HttpServer::legacy(config.server.clone(), backend, config.table()?)
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}
