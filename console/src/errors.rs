//! Error types for the SnapDeploy console

use openapi_client::models::ErrorResponse;
use http::StatusCode;
use thiserror::Error;

/// Main error type for the SnapDeploy console
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {}", api_description(.body, .raw))]
    ApiError {
        status: StatusCode,
        body: Option<ErrorResponse>,
        raw: String,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Build an API error from a non-success response body
    pub fn api(status: StatusCode, raw: String) -> Self {
        let body = serde_json::from_str::<ErrorResponse>(&raw).ok();
        ConsoleError::ApiError { status, body, raw }
    }

    /// HTTP status of the failed call, when the backend answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ConsoleError::ApiError { status, .. } => Some(*status),
            ConsoleError::HttpError(e) => e.status(),
            _ => None,
        }
    }

    /// Machine-readable error code from the backend payload
    pub fn api_code(&self) -> Option<&str> {
        match self {
            ConsoleError::ApiError {
                body: Some(body), ..
            } if !body.error.is_empty() => Some(body.error.as_str()),
            _ => None,
        }
    }

    /// Human-readable description: payload message, then payload code
    pub fn description(&self) -> String {
        match self {
            ConsoleError::ApiError { body, raw, .. } => api_description(body, raw),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConsoleError::NotFound(_))
            || self.status() == Some(StatusCode::NOT_FOUND)
            || self.api_code() == Some("not_found")
    }
}

fn api_description(body: &Option<ErrorResponse>, raw: &str) -> String {
    if let Some(body) = body {
        if !body.message.is_empty() {
            return body.message.clone();
        }
        if !body.error.is_empty() {
            return body.error.clone();
        }
    }
    let raw = raw.trim();
    if raw.is_empty() {
        "Unknown error".to_string()
    } else {
        raw.to_string()
    }
}
