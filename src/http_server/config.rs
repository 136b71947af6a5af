//! Listener and CORS settings shared by the counter and legacy services.
//!
//! Browser dashboards call both services cross-origin, so an empty
//! `cors_origins` list allows every origin with any method and header.
//! Listing origins restricts `Access-Control-Allow-Origin` to those
//! entries; entries that are not valid header values are skipped.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Bind address (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port (default: 5000, overridden by `PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// `host:port`
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when no origin list is configured
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty()
    }

    /// Configured origins that parse as header values
    pub fn allowed_origins(&self) -> Vec<HeaderValue> {
        self.cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_any_origin_on_port_5000() {
        let config = HttpServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:5000");
        assert!(config.allows_any_origin());
        assert!(config.allowed_origins().is_empty());
    }

    #[test]
    fn test_origin_list_skips_invalid_entries() {
        let config = HttpServerConfig {
            cors_origins: vec![
                "https://dash.example.com".to_string(),
                "bad\norigin".to_string(),
            ],
            ..Default::default()
        };
        assert!(!config.allows_any_origin());
        assert_eq!(
            config.allowed_origins(),
            vec![HeaderValue::from_static("https://dash.example.com")]
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: HttpServerConfig = serde_json::from_str(r#"{"port": 6000}"#).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.allows_any_origin());
    }
}
