//! Error types for the Bookstore API

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Body returned for every failure that ends up as a 500
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please contact the Administrator";

/// Application error codes carried in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    BadValue = 4,
    TooLarge = 5,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Invalid base64 image content: {0}")]
    Image(#[from] base64::DecodeError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Field-level validation failures, keyed by field name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as u32,
            error: format!("{:?}", code),
            message: message.into(),
            details: None,
        }
    }
}

impl AppError {
    /// Failure reported as a generic 500, logged in the caller's span
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("{}", message);
        AppError::Internal(message)
    }
}

// Server-side failures are logged at conversion, inside the caller's span
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {} - {:?}", e, e);
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", e);
        AppError::Io(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Authentication(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(ErrorCode::NotAuthorized, msg),
            ),
            AppError::Authorization(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new(ErrorCode::NotAuthorized, msg),
            ),
            // Not-found carries no body
            AppError::NotFound(_) => return StatusCode::NOT_FOUND.into_response(),
            AppError::Validation(errors) => {
                let mut body = ErrorResponse::new(ErrorCode::BadValue, "Invalid request body");
                body.details = serde_json::to_value(errors.field_errors()).ok();
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::BadValue, msg),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new(ErrorCode::TooLarge, msg),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::DbFailure, GENERIC_ERROR_MESSAGE),
            ),
            AppError::Image(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::BadValue, format!("Invalid image content: {}", e)),
            ),
            AppError::Io(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::Failure, GENERIC_ERROR_MESSAGE),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        // Malformed or null bodies are all 400; only the size limit keeps its status
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
