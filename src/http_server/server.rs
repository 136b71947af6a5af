//! # HTTP Server
//!
//! Builds the router for either the counter service or the legacy service
//! and serves it until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::counter_routes::{counter_routes, CounterState};
use super::legacy_routes::{legacy_routes, LegacyState};
use super::observability_routes::health_routes;
use crate::counter::CounterService;
use crate::observability::{Event, Logger};
use crate::sheets::{A1Range, SheetBackend};

/// HTTP server for one of the two services
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Counter service: increase, decrease, update-used, unused, last-row
    pub fn counter(config: HttpServerConfig, service: Arc<CounterService>) -> Self {
        let routes = counter_routes(Arc::new(CounterState::new(service)));
        Self::with_routes(config, routes)
    }

    /// Legacy service: write, last-row
    pub fn legacy(
        config: HttpServerConfig,
        backend: Arc<dyn SheetBackend>,
        table: A1Range,
    ) -> Self {
        let routes = legacy_routes(Arc::new(LegacyState::new(backend, table)));
        Self::with_routes(config, routes)
    }

    fn with_routes(config: HttpServerConfig, routes: Router) -> Self {
        let router = Router::new()
            .merge(health_routes())
            .merge(routes)
            .layer(Self::cors_layer(&config));
        Self { config, router }
    }

    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let origin = if config.allows_any_origin() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(config.allowed_origins())
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info(Event::ServerStart, &[("addr", addr.to_string().as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Logger::info(Event::ServerStop, &[]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CounterCache;
    use crate::counter::CounterOptions;
    use crate::sheets::MemorySheet;

    fn service() -> Arc<CounterService> {
        Arc::new(
            CounterService::new(
                Arc::new(MemorySheet::new("Master", 0)),
                Arc::new(CounterCache::default()),
                CounterOptions::default(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = HttpServer::counter(HttpServerConfig::with_port(8080), service());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_origins() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::counter(config, service()).router();
    }

    #[test]
    fn test_legacy_router_builds() {
        let backend: Arc<dyn SheetBackend> = Arc::new(MemorySheet::new("Master", 0));
        let table = A1Range::columns("Master", "A", "B").unwrap();
        let server = HttpServer::legacy(HttpServerConfig::default(), backend, table);
        assert_eq!(server.socket_addr(), "0.0.0.0:5000");
    }
}
