use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::export::ExportError;
use crate::extract::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "error": <message>, "details"?: <detail> }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Free trial limit of {limit} optimizations reached")]
    TrialLimitReached { limit: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Provider or parse failure; `message` is already user-facing.
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        details: Option<String>,
    },

    #[error("Service misconfigured: {0}")]
    Misconfigured(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ExtractError::UnsupportedFormat(_) => AppError::UnsupportedMediaType(err.to_string()),
            ExtractError::Decode { .. } => AppError::Validation(err.to_string()),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) => AppError::Validation(err.to_string()),
            ExportError::Pdf(_) | ExportError::Docx(_) => AppError::Export(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details): (StatusCode, String, Option<String>) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::MalformedBody(detail) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                Some(detail),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Sign in to access saved optimizations".to_string(),
                None,
            ),
            AppError::TrialLimitReached { limit } => (
                StatusCode::FORBIDDEN,
                format!(
                    "You have used all {limit} free optimizations. Sign in to continue optimizing."
                ),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg, None)
            }
            AppError::Provider { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
            AppError::Misconfigured(reason) => {
                tracing::error!("Service misconfigured: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service misconfigured. Please contact support.".to_string(),
                    None,
                )
            }
            AppError::Export(msg) => {
                tracing::error!("Export error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(error_body(&message, details.as_deref()))).into_response()
    }
}

fn error_body(message: &str, details: Option<&str>) -> Value {
    match details {
        Some(details) => json!({ "error": message, "details": details }),
        None => json!({ "error": message }),
    }
}
