//! Error types
//!
//! Fetch-path errors for the cached wrappers and admin-surface errors,
//! both built with thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::fetch::RawResponse;

// == Fetch Error ==
/// Failures surfaced by the fetch wrappers. None of these are ever cached.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-success status from `cached_fetch`
    #[error("Failed to fetch: {status_text}")]
    Status { status: u16, status_text: String },

    /// Non-success response from the response-shaped wrapper, handed back as received
    #[error("Request rejected with status {}", .0.status)]
    Rejected(RawResponse),

    /// Non-success status from the query proxy
    #[error("Paid API error: {status} {status_text}")]
    Api { status: u16, status_text: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body was not the expected JSON
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request descriptor lacks an id it needs
    #[error("Missing required parameters: {0}")]
    MissingParameters(String),

    /// The request cannot be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } | FetchError::Api { status, .. } => Some(*status),
            FetchError::Rejected(response) => Some(response.status),
            _ => None,
        }
    }
}

// == Api Error ==
/// Errors of the admin surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key absent or expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Billing backend unreachable or refused the read
    #[error("{0}")]
    Upstream(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fetch wrappers.
pub type Result<T> = std::result::Result<T, FetchError>;
