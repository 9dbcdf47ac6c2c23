//! Error types for the print job service

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::jobs::JobStatus;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    InvalidRequest(String),

    /// A setting the request needs was never provided
    #[error("{0}")]
    MissingConfig(String),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("unauthorized")]
    Unauthorized,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Canva answered with a non-success status
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::JobNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized | AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::MissingConfig(_)
            | AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Migration(_) | AppError::Internal(_) => {
                "internal server error".to_string()
            }
            AppError::Http(_) => "upstream request failed".to_string(),
            other => other.to_string(),
        }
    }

    fn log(&self) {
        match self.status_code() {
            status if status.is_server_error() => {
                tracing::error!(error = %self, status = status.as_u16(), "Request failed");
            }
            status => {
                tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            }
        }
    }

    /// Render as a `text/plain` response, used by the browser-facing OAuth pages
    pub fn into_plain_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = match &self {
            AppError::Upstream { status, body } => {
                format!("OAuth token exchange failed. Status {status}: {body}")
            }
            _ => self.public_message(),
        };
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();

        let body = match &self {
            AppError::Upstream { body, .. } => json!({
                "error": "upstream request failed",
                "details": body,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
