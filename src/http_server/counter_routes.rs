//! Counter HTTP Routes
//!
//! Endpoints backed by [`CounterService`]:
//!
//! - `POST /increase`
//! - `POST /decrease`
//! - `POST /update-used`
//! - `GET /unused`
//! - `GET /last-row`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::response::{MessageResponse, RouteError};
use crate::counter::{CounterService, LastRowView};
use crate::sheets::Row;

// ==================
// Shared State
// ==================

/// Counter state shared across handlers
pub struct CounterState {
    pub service: Arc<CounterService>,
}

impl CounterState {
    pub fn new(service: Arc<CounterService>) -> Self {
        Self { service }
    }
}

// ==================
// Request/Response Types
// ==================

/// Row number as sent by clients: a JSON number or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RowNumber {
    Number(i64),
    Text(String),
}

impl RowNumber {
    /// 0-based row number, rejecting negatives and non-numeric text
    pub fn to_index(&self) -> Result<u64, RouteError> {
        let value = match self {
            RowNumber::Number(n) => *n,
            RowNumber::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| RouteError::bad_request(format!("Invalid row number: {:?}", s)))?,
        };
        u64::try_from(value)
            .map_err(|_| RouteError::bad_request(format!("Invalid row number: {}", value)))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsedRequest {
    pub number: RowNumber,
}

/// Body of `GET /last-row`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LastRowResponse {
    Row(LastRowView),
    Empty(MessageResponse),
}

// ==================
// Counter Routes
// ==================

/// Create counter routes
pub fn counter_routes(state: Arc<CounterState>) -> Router {
    Router::new()
        .route("/increase", post(increase_handler))
        .route("/decrease", post(decrease_handler))
        .route("/update-used", post(update_used_handler))
        .route("/unused", get(unused_handler))
        .route("/last-row", get(last_row_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn increase_handler(
    State(state): State<Arc<CounterState>>,
) -> Result<Json<MessageResponse>, RouteError> {
    state.service.increment().await?;
    Ok(Json(MessageResponse::new("Data written successfully!")))
}

async fn decrease_handler(
    State(state): State<Arc<CounterState>>,
) -> Result<Json<MessageResponse>, RouteError> {
    state.service.decrement().await?;
    Ok(Json(MessageResponse::new("Data Deleted successfully!")))
}

async fn update_used_handler(
    State(state): State<Arc<CounterState>>,
    payload: Result<Json<UpdateUsedRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, RouteError> {
    let Json(request) = payload?;
    let number = request.number.to_index()?;
    state.service.mark_used(number).await?;
    Ok(Json(MessageResponse::new(format!(
        "Number {} updated successfully!",
        number
    ))))
}

async fn unused_handler(
    State(state): State<Arc<CounterState>>,
) -> Result<Json<Vec<Row>>, RouteError> {
    Ok(Json(state.service.list_unused().await?))
}

async fn last_row_handler(
    State(state): State<Arc<CounterState>>,
) -> Result<Json<LastRowResponse>, RouteError> {
    let response = match state.service.last_row_view().await? {
        Some(view) => LastRowResponse::Row(view),
        None => LastRowResponse::Empty(MessageResponse::new("No data found.")),
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_number_accepts_number_and_text() {
        let body: UpdateUsedRequest = serde_json::from_str(r#"{"number": 4}"#).unwrap();
        assert_eq!(body.number.to_index().unwrap(), 4);

        let body: UpdateUsedRequest = serde_json::from_str(r#"{"number": " 12 "}"#).unwrap();
        assert_eq!(body.number.to_index().unwrap(), 12);
    }

    #[test]
    fn test_row_number_rejects_negative_and_garbage() {
        let body: UpdateUsedRequest = serde_json::from_str(r#"{"number": -1}"#).unwrap();
        assert!(body.number.to_index().is_err());

        let body: UpdateUsedRequest = serde_json::from_str(r#"{"number": "seven"}"#).unwrap();
        assert!(body.number.to_index().is_err());
    }

    #[test]
    fn test_empty_last_row_response() {
        let json =
            serde_json::to_value(LastRowResponse::Empty(MessageResponse::new("No data found.")))
                .unwrap();
        assert_eq!(json, serde_json::json!({"message": "No data found."}));
    }
}
