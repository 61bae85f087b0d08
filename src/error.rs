use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Shared error message constants so handlers and tests agree on wording.
pub mod msg {
    pub const STORE_NOT_FOUND: &str = "Store not found";
    pub const STORE_EXISTS: &str = "Store already exists";
    pub const UNKNOWN_PACKAGE_KIND: &str = "Unknown package kind";
    pub const UNKNOWN_AD_TIER: &str = "Unknown ad tier";
    pub const INVALID_RETURN_URL: &str = "return_url must be an http(s) URL";
    pub const INVALID_CANCEL_URL: &str = "cancel_url must be an http(s) URL";
    pub const INVALID_CHECKSUM_KEY: &str = "Invalid checksum key";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::InvalidPayload(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::InvalidPackage(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid package", Some(msg.clone()))
            }
            AppError::InvalidPayload(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid payload", Some(msg.clone()))
            }
            AppError::SignatureInvalid => (StatusCode::BAD_REQUEST, "Invalid signature", None),
            AppError::GatewayUnavailable(msg) => {
                tracing::error!("Gateway error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment gateway unavailable", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Extension for turning `Option` lookups into 404 responses.
pub trait OptionExt<T> {
    fn or_not_found(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(msg.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
