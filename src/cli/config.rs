//! Service configuration
//!
//! Loaded in three steps:
//! 1. Optional JSON file (`--config`)
//! 2. Environment overrides (`SPREADSHEET_ID`, `SHEET_ID`, `PORT`, ...)
//! 3. Validation
//!
//! Credentials are resolved only when the remote backend is built, so the
//! in-memory mode runs without them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::cache::DEFAULT_TTL;
use crate::counter::{CounterOptions, COUNTER_TABLE_COLUMNS};
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::refresh::{RefreshScheduler, DEFAULT_REFRESH_CRON};
use crate::sheets::{
    A1Range, GoogleSheetsClient, MemorySheet, ServiceAccountAuth, ServiceAccountKey,
    SheetBackend, TokenProvider,
};

/// Full service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Target spreadsheet (required for the remote backend)
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Numeric id of the tracked sheet, used for row deletion
    #[serde(default)]
    pub sheet_id: i64,

    /// Name of the tracked sheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Lifetime of both cache entries
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Schedule of the forced last-row refresh
    #[serde(default = "default_refresh_cron")]
    pub refresh_cron: String,

    /// Run increment/decrement one at a time
    #[serde(default)]
    pub serialize_mutations: bool,

    /// Timeout for each remote call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Service account key as inline JSON
    #[serde(default, skip_serializing)]
    pub credentials_json: Option<String>,

    /// Path to a service account key file
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Pre-minted bearer token, used instead of a service account
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Sheets API endpoint override
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Minimum log severity
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sheet_name() -> String {
    "Master".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}
fn default_refresh_cron() -> String {
    DEFAULT_REFRESH_CRON.to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            spreadsheet_id: None,
            sheet_id: 0,
            sheet_name: default_sheet_name(),
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_cron: default_refresh_cron(),
            serialize_mutations: false,
            request_timeout_secs: default_request_timeout_secs(),
            credentials_json: None,
            credentials_path: None,
            access_token: None,
            api_base_url: None,
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Load from an optional file, apply process environment, validate
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::load`] with environment lookups through `lookup`
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Override fields from environment variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SPREADSHEET_ID") {
            self.spreadsheet_id = Some(v);
        }
        if let Some(v) = get("SHEET_ID") {
            self.sheet_id = parse_env("SHEET_ID", &v)?;
        }
        if let Some(v) = get("SHEET_NAME") {
            self.sheet_name = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("GOOGLE_SERVICE_ACCOUNT_KEY") {
            self.credentials_json = Some(v);
        }
        if let Some(v) = get("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("SHEETS_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
        if let Some(v) = get("CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_env("CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("SERIALIZE_MUTATIONS") {
            self.serialize_mutations = parse_env("SERIALIZE_MUTATIONS", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
        Ok(())
    }

    /// Validate field values
    pub fn validate(&self) -> CliResult<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(CliError::config_error("sheet_name must not be empty"));
        }
        if self.cache_ttl_secs == 0 {
            return Err(CliError::config_error("cache_ttl_secs must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(CliError::config_error("request_timeout_secs must be > 0"));
        }
        if self.severity().is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }
        RefreshScheduler::new(&self.refresh_cron)?;
        self.table()?;
        Ok(())
    }

    /// Parsed minimum log severity
    pub fn severity(&self) -> Option<Severity> {
        Severity::parse(&self.log_level)
    }

    /// Cache entry lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// The tracked two-column range
    pub fn table(&self) -> CliResult<A1Range> {
        let (first, last) = COUNTER_TABLE_COLUMNS;
        A1Range::columns(&self.sheet_name, first, last)
            .map_err(|e| CliError::config_error(e.to_string()))
    }

    /// Counter service options
    pub fn counter_options(&self) -> CounterOptions {
        CounterOptions {
            sheet_name: self.sheet_name.clone(),
            sheet_id: self.sheet_id,
            serialize_mutations: self.serialize_mutations,
        }
    }

    /// Resolve the token source: static token, inline key, then key file
    pub fn token_provider(&self) -> CliResult<TokenProvider> {
        if let Some(token) = &self.access_token {
            return Ok(TokenProvider::static_token(token.clone()));
        }

        let key_json = match (&self.credentials_json, &self.credentials_path) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => fs::read_to_string(path).map_err(|e| {
                CliError::config_error(format!(
                    "Failed to read credentials {}: {}",
                    path.display(),
                    e
                ))
            })?,
            (None, None) => {
                return Err(CliError::config_error(
                    "No credentials: set GOOGLE_SERVICE_ACCOUNT_KEY or GOOGLE_APPLICATION_CREDENTIALS",
                ))
            }
        };

        let key = ServiceAccountKey::from_json(&key_json)
            .map_err(|e| CliError::config_error(e.to_string()))?;
        Ok(TokenProvider::ServiceAccount(ServiceAccountAuth::new(key)))
    }

    /// Build the sheet backend
    pub fn build_backend(&self, in_memory: bool) -> CliResult<Arc<dyn SheetBackend>> {
        if in_memory {
            return Ok(Arc::new(MemorySheet::new(
                self.sheet_name.clone(),
                self.sheet_id,
            )));
        }

        let spreadsheet_id = self
            .spreadsheet_id
            .clone()
            .ok_or_else(|| CliError::config_error("SPREADSHEET_ID is required"))?;
        let token_provider = self.token_provider()?;
        let timeout = Duration::from_secs(self.request_timeout_secs);

        let client = match &self.api_base_url {
            Some(base) => {
                GoogleSheetsClient::with_base_url(base, spreadsheet_id, token_provider, timeout)?
            }
            None => GoogleSheetsClient::new(spreadsheet_id, token_provider, timeout)?,
        };
        Ok(Arc::new(client))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> CliResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::config_error(format!("Invalid {}: '{}'", key, value)))
}
