// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! On Cloud Run the secrets (client secret, refresh token) arrive as
//! environment variables via secret bindings, so everything is read from
//! the environment once at startup.

use crate::models::TokenSet;
use crate::retry::RetryPolicy;
use std::env;
use std::time::Duration;

/// Strava API endpoints and call behavior.
///
/// The token and activity call sites carry distinct retry policies: token
/// refresh failures are rarer and retried less than transient fetch
/// failures.
#[derive(Debug, Clone)]
pub struct StravaApiConfig {
    /// OAuth token endpoint
    pub token_url: String,
    /// REST API base URL
    pub api_base_url: String,
    /// Per-request timeout applied to every outbound call
    pub request_timeout: Duration,
    /// Retry policy for token refresh
    pub token_retry: RetryPolicy,
    /// Retry policy for activity fetch
    pub activity_retry: RetryPolicy,
}

impl Default for StravaApiConfig {
    fn default() -> Self {
        Self {
            token_url: "https://www.strava.com/oauth/token".to_string(),
            api_base_url: "https://www.strava.com/api/v3".to_string(),
            request_timeout: Duration::from_secs(10),
            token_retry: RetryPolicy::new(2, Duration::from_millis(500)),
            activity_retry: RetryPolicy::new(3, Duration::from_secs(1)),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: u64,
    /// GCP project ID
    pub gcp_project_id: String,
    /// BigQuery dataset holding the activities table
    pub bq_dataset: String,
    /// Server port
    pub port: u16,

    // --- Secrets (injected as env vars by Cloud Run secret bindings) ---
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Strava OAuth refresh token
    pub strava_refresh_token: String,
    /// Webhook verification token
    pub webhook_verify_token: String,

    /// Strava API endpoints and retry behavior
    pub strava_api: StravaApiConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("STRAVA_CLIENT_ID"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            bq_dataset: env::var("BQ_DATASET").map_err(|_| ConfigError::Missing("BQ_DATASET"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            strava_refresh_token: env::var("STRAVA_REFRESH_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_REFRESH_TOKEN"))?,
            webhook_verify_token: env::var("WEBHOOK_VERIFY_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_VERIFY_TOKEN"))?,

            strava_api: StravaApiConfig::default(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: 1,
            gcp_project_id: "test-project".to_string(),
            bq_dataset: "test_dataset".to_string(),
            port: 8080,
            strava_client_secret: "test_secret".to_string(),
            strava_refresh_token: "test_refresh_token".to_string(),
            webhook_verify_token: "test_verify_token".to_string(),
            strava_api: StravaApiConfig::default(),
        }
    }

    /// Initial token set built from credentials; the access token is empty
    /// until the first refresh.
    pub fn tokens(&self) -> TokenSet {
        TokenSet {
            client_id: self.strava_client_id,
            client_secret: self.strava_client_secret.clone(),
            refresh_token: self.strava_refresh_token.clone(),
            access_token: String::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
