//! # HTTP Server Module
//!
//! Axum routers for the counter service and the legacy service.
//!
//! # Endpoints
//!
//! - `/health` - Health check (both services)
//! - `/increase`, `/decrease`, `/update-used`, `/unused`, `/last-row` - counter service
//! - `/write`, `/last-row` - legacy service

pub mod config;
pub mod counter_routes;
pub mod legacy_routes;
pub mod observability_routes;
pub mod response;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
