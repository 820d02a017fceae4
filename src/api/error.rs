//! API error types.
//!
//! Absent data is a normal `None` inside the extraction core; these types
//! cover the request-level failures: bad input, no extractable data, and
//! upstream fetch problems. Messages for the last two are deliberately
//! distinguishable in client output.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors returned to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("could not extract song information: {0}")]
    NotFound(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] FetchError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
