//! Error type for HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiamsu_common::lyric_form::FieldError;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Form fields failed validation (400)
    #[error("Invalid form: {} field error(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    /// Signed-in staff account required (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// thiamsu-common error
    #[error("Common error: {0}")]
    Common(#[from] thiamsu_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, fields) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::InvalidFields(errors) => (
                StatusCode::BAD_REQUEST,
                "INVALID_FIELDS",
                "Form has invalid fields".to_string(),
                Some(errors),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    msg,
                    None,
                )
            }
            ApiError::Common(err) => common_error(err),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        if let Some(fields) = fields {
            body["error"]["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

fn common_error(
    err: thiamsu_common::Error,
) -> (StatusCode, &'static str, String, Option<Vec<FieldError>>) {
    use thiamsu_common::Error;

    match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
        Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
        Error::SongLocked(id) => (
            StatusCode::CONFLICT,
            "SONG_LOCKED",
            format!("Song {} is locked", id),
            None,
        ),
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                other.to_string(),
                None,
            )
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
