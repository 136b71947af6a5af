//! CLI argument definitions using clap
//!
//! Commands:
//! - sheetcounter serve [--config <path>] [--port <n>] [--in-memory]
//! - sheetcounter serve-legacy [--config <path>] [--port <n>] [--in-memory]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// SheetCounter - a cached counter service backed by a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "sheetcounter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by both services
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Path to a JSON configuration file; environment variables override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Serve from an in-memory sheet instead of the remote spreadsheet
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the counter service
    Serve(ServeArgs),

    /// Start the legacy write/last-row service
    ServeLegacy(ServeArgs),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["sheetcounter", "serve", "--port", "7000", "--in-memory"])
            .unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, Some(7000));
                assert!(args.in_memory);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_legacy() {
        let cli =
            Cli::try_parse_from(["sheetcounter", "serve-legacy", "--config", "svc.json"]).unwrap();
        assert!(matches!(cli.command, Command::ServeLegacy(ref a) if a.config.is_some()));
    }
}
