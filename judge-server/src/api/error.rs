//! Error responses
//!
//! Every failure is rendered as `{ "success": false, "error": "..." }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use judge_common::api::ErrorResponse;

use crate::aggregator::VoteError;

/// API error types for HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// Missing, malformed, unknown, or expired bearer token
    Unauthorized,
    /// Login with a wrong username or password
    InvalidCredentials,
    /// Rejected request; nothing was written
    Validation(String),
    /// Persistence failure
    Storage(String),
    /// Resource loading or other server-side failure
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::Validation(msg) | ApiError::Storage(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.message()))).into_response()
    }
}

impl From<VoteError> for ApiError {
    fn from(e: VoteError) -> Self {
        if e.is_validation() {
            ApiError::Validation(e.to_string())
        } else {
            ApiError::Storage(e.to_string())
        }
    }
}

impl From<judge_common::Error> for ApiError {
    fn from(e: judge_common::Error) -> Self {
        match e {
            judge_common::Error::Database(_) => ApiError::Storage(e.to_string()),
            judge_common::Error::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
