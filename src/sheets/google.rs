//! # Google Sheets v4 Client
//!
//! REST implementation of [`SheetBackend`] against
//! `https://sheets.googleapis.com/v4/spreadsheets/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::TokenProvider;
use super::backend::{cell_text, Row, SheetBackend};
use super::errors::{SheetError, SheetResult};
use super::range::A1Range;
use crate::observability::{Event, Logger};

/// Public Sheets API endpoint
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

const USER_AGENT_VALUE: &str = concat!("sheetcounter/", env!("CARGO_PKG_VERSION"));

/// Value input mode for writes; cells are parsed as if typed by a user
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Sheets API client bound to one spreadsheet
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    token_provider: TokenProvider,
}

impl GoogleSheetsClient {
    /// Create a client for `spreadsheet_id`
    pub fn new(
        spreadsheet_id: impl Into<String>,
        token_provider: TokenProvider,
        timeout: Duration,
    ) -> SheetResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, spreadsheet_id, token_provider, timeout)
    }

    /// Create a client against a custom endpoint (emulators, proxies)
    pub fn with_base_url(
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        token_provider: TokenProvider,
        timeout: Duration,
    ) -> SheetResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| SheetError::Transport(format!("failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SheetError::Transport(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
        })
    }

    /// Build `{base}/v4/spreadsheets/{id}{suffix}` followed by `segments`,
    /// percent-encoding each segment.
    fn url(&self, id_suffix: &str, segments: &[&str]) -> SheetResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SheetError::Transport("base URL cannot be a base".to_string()))?;
            path.pop_if_empty();
            path.push("v4");
            path.push("spreadsheets");
            path.push(&format!("{}{}", self.spreadsheet_id, id_suffix));
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn values_url(&self, range: &A1Range, suffix: &str) -> SheetResult<Url> {
        self.url("", &["values", &format!("{}{}", range, suffix)])
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> SheetResult<Value> {
        let token = self.token_provider.get_token(&self.client).await?;
        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

            Logger::error(
                Event::BackendError,
                &[
                    ("status", status.as_u16().to_string().as_str()),
                    ("error", message.as_str()),
                ],
            );
            return Err(SheetError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SheetBackend for GoogleSheetsClient {
    async fn read_range(&self, range: &A1Range) -> SheetResult<Vec<Row>> {
        let url = self.values_url(range, "")?;
        let body = self.send(Method::GET, url, None).await?;
        let value_range: ValueRange = serde_json::from_value(body)
            .map_err(|e| SheetError::MalformedResponse(e.to_string()))?;

        Logger::trace(
            Event::BackendRead,
            &[
                ("range", range.to_string().as_str()),
                ("rows", value_range.values.len().to_string().as_str()),
            ],
        );

        Ok(value_range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, range: &A1Range, values: Vec<Value>) -> SheetResult<()> {
        let mut url = self.values_url(range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        self.send(Method::POST, url, Some(json!({ "values": [values] })))
            .await?;
        Ok(())
    }

    async fn update_range(&self, range: &A1Range, values: Vec<Vec<Value>>) -> SheetResult<()> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        let body = json!({ "range": range.to_string(), "values": values });
        self.send(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    async fn delete_rows(
        &self,
        sheet_id: i64,
        start_index: u64,
        end_index: u64,
    ) -> SheetResult<()> {
        let url = self.url(":batchUpdate", &[])?;
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start_index,
                        "endIndex": end_index,
                    }
                }
            }]
        });
        self.send(Method::POST, url, Some(body)).await?;
        Ok(())
    }
}
