// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for token refresh and activity fetch.
//!
//! Every outbound call goes through the retry engine with the policy
//! configured for its call site; this module only maps terminal failures
//! onto domain errors (404 -> not found, 401 -> token rejected).

use crate::config::StravaApiConfig;
use crate::error::AppError;
use crate::models::{Activity, TokenSet};
use crate::retry;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api: StravaApiConfig,
}

impl StravaClient {
    /// Create a new Strava client with the configured request timeout.
    pub fn new(api: StravaApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout)
            .build()
            .map_err(AppError::Http)?;

        Ok(Self { http, api })
    }

    /// Exchange the stored refresh token for a fresh access token.
    ///
    /// Returns a new token set with only the access token replaced, plus
    /// the expiry Strava reports for it. The input set is never mutated.
    pub async fn refresh_tokens(&self, tokens: &TokenSet) -> Result<RefreshedTokens, AppError> {
        let client_id = tokens.client_id.to_string();
        let response = retry::execute(
            || {
                self.http
                    .post(self.api.token_url.as_str())
                    .form(&[
                        ("client_id", client_id.as_str()),
                        ("client_secret", tokens.client_secret.as_str()),
                        ("refresh_token", tokens.refresh_token.as_str()),
                        ("grant_type", "refresh_token"),
                    ])
                    .send()
            },
            &self.api.token_retry,
        )
        .await
        .map_err(|e| match e {
            AppError::Api { status: 401, .. } => AppError::Token {
                status: 401,
                activity_id: None,
            },
            other => other,
        })?;

        let body: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| AppError::Validation(format!("token response: {e}")))?;

        tracing::info!("Access token refreshed");

        Ok(RefreshedTokens {
            expires_at: body
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            tokens: tokens.with_access_token(body.access_token),
        })
    }

    /// Fetch a detailed activity by ID using the bearer token in `tokens`.
    pub async fn get_activity(
        &self,
        tokens: &TokenSet,
        activity_id: u64,
    ) -> Result<Activity, AppError> {
        let url = format!("{}/activities/{}", self.api.api_base_url, activity_id);

        let response = retry::execute(
            || {
                self.http
                    .get(&url)
                    .bearer_auth(&tokens.access_token)
                    .send()
            },
            &self.api.activity_retry,
        )
        .await
        .map_err(|e| match e {
            AppError::Api { status: 404, .. } => AppError::ActivityNotFound(activity_id),
            AppError::Api { status: 401, .. } => AppError::Token {
                status: 401,
                activity_id: Some(activity_id),
            },
            other => other,
        })?;

        let body = response.text().await.map_err(AppError::Http)?;
        Activity::from_json(&body)
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Result of a token refresh: the replacement set and its expiry.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub tokens: TokenSet,
    /// Absent if Strava did not report an expiry; the caller then skips
    /// caching and refreshes again next time.
    pub expires_at: Option<DateTime<Utc>>,
}
