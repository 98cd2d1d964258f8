//! API Error Taxonomy
//!
//! Every failure that can reach an HTTP caller is one of these variants.
//! Cache failures and undecodable result rows never get here: the cache gateway
//! swallows the former and the orchestrators skip the latter.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A required input is missing. Raised before any backend call.
    #[error("{0}")]
    Validation(String),

    /// The document store failed or did not answer in time.
    /// The message is the short, caller-safe description; details go to the log.
    #[error("{0}")]
    BackendUnavailable(String),

    /// The auth layer rejected the request.
    #[error("{0}")]
    Unauthorized(String),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SearchError::Validation(_) => StatusCode::BAD_REQUEST,
            SearchError::BackendUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
