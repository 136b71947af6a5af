//! Legacy HTTP Routes
//!
//! The first-generation write/read entry point: raw appends and an uncached last-row
//! read. Shares nothing with the counter routes.
//!
//! - `POST /write` `{number, is_used}`
//! - `GET /last-row`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::response::{MessageResponse, RouteError};
use crate::sheets::{A1Range, Row, SheetBackend};

/// Legacy state shared across handlers
pub struct LegacyState {
    pub backend: Arc<dyn SheetBackend>,
    pub table: A1Range,
}

impl LegacyState {
    pub fn new(backend: Arc<dyn SheetBackend>, table: A1Range) -> Self {
        Self { backend, table }
    }
}

/// Cells are forwarded as sent, so numbers and booleans are both accepted
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    #[serde(default)]
    pub number: Value,
    #[serde(default)]
    pub is_used: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LegacyLastRowResponse {
    Row {
        #[serde(rename = "lastRow")]
        last_row: Row,
    },
    Empty(MessageResponse),
}

/// Create legacy routes
pub fn legacy_routes(state: Arc<LegacyState>) -> Router {
    Router::new()
        .route("/write", post(write_handler))
        .route("/last-row", get(last_row_handler))
        .with_state(state)
}

async fn write_handler(
    State(state): State<Arc<LegacyState>>,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, RouteError> {
    let Json(request) = payload?;
    state
        .backend
        .append_row(&state.table, vec![request.number, request.is_used])
        .await?;
    Ok(Json(MessageResponse::new("Data written successfully!")))
}

async fn last_row_handler(
    State(state): State<Arc<LegacyState>>,
) -> Result<Json<LegacyLastRowResponse>, RouteError> {
    let mut rows = state.backend.read_range(&state.table).await?;
    let response = match rows.pop() {
        Some(last_row) => LegacyLastRowResponse::Row { last_row },
        None => LegacyLastRowResponse::Empty(MessageResponse::new("No data found.")),
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_row_response_shape() {
        let json = serde_json::to_value(LegacyLastRowResponse::Row {
            last_row: vec!["3".into(), "TRUE".into()],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"lastRow": ["3", "TRUE"]}));
    }

    #[test]
    fn test_write_request_missing_fields_default_to_null() {
        let body: WriteRequest = serde_json::from_str(r#"{"number": 5}"#).unwrap();
        assert_eq!(body.number, serde_json::json!(5));
        assert!(body.is_used.is_null());
    }
}
