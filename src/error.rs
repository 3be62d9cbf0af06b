// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error("Strava rejected the access token (HTTP {status})")]
    Token {
        status: u16,
        /// Set when the rejection happened while fetching a specific activity.
        activity_id: Option<u64>,
    },

    #[error("Strava rate limit exceeded, retry after {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Activity {0} not found")]
    ActivityNotFound(u64),

    #[error("Strava API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BigQuery error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error means the Strava credential was rejected.
    pub fn is_token_error(&self) -> bool {
        matches!(self, AppError::Token { .. })
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_payload", Some(msg.clone()))
            }
            AppError::Token { .. } => (StatusCode::BAD_GATEWAY, "strava_token_error", None),
            AppError::RateLimitExceeded { retry_after } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "rate_limited",
                Some(format!("retry after {retry_after}s")),
            ),
            AppError::ActivityNotFound(id) => (
                StatusCode::NOT_FOUND,
                "activity_not_found",
                Some(id.to_string()),
            ),
            AppError::Api { status, body } => {
                tracing::error!(status, body = %body, "Strava API error");
                (StatusCode::BAD_GATEWAY, "strava_error", None)
            }
            AppError::Http(err) => {
                tracing::error!(error = %err, "Outbound request error");
                (StatusCode::BAD_GATEWAY, "upstream_error", None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "BigQuery error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Config(err) => {
                tracing::error!(error = %err, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
