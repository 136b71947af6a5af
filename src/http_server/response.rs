//! Shared response bodies and the route error type.
//!
//! Success and domain-precondition replies carry `{message}`;
//! server failures carry `{error}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::counter::CounterError;
use crate::observability::{Event, Logger};
use crate::sheets::SheetError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by route handlers
#[derive(Debug)]
pub struct RouteError {
    status: StatusCode,
    message: String,
}

impl RouteError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CounterError> for RouteError {
    fn from(e: CounterError) -> Self {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.to_string())
    }
}

impl From<SheetError> for RouteError {
    fn from(e: SheetError) -> Self {
        CounterError::from(e).into()
    }
}

/// Malformed request bodies keep axum's status but use the `{error}` shape
impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            return (self.status, Json(MessageResponse::new(self.message))).into_response();
        }

        if self.status.is_server_error() {
            Logger::error(
                Event::RequestFailed,
                &[
                    ("status", self.status.as_str()),
                    ("error", self.message.as_str()),
                ],
            );
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}
