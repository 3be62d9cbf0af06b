// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync pipeline: fetch one activity from Strava and write it to the
//! warehouse.
//!
//! The access token is refreshed lazily and cached in-process until it
//! nears expiry, so a long-lived server keeps working across Strava's
//! six-hour token lifetime. The cache lock is only held to read or swap
//! the cached value, never across a network call, so a backoff sleep in
//! the retry engine can never block another invocation on the lock.

use crate::db::WriteActivities;
use crate::error::AppError;
use crate::models::TokenSet;
use crate::services::strava::StravaClient;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Cached access token with expiry information.
#[derive(Clone)]
struct CachedTokens {
    tokens: TokenSet,
    expires_at: DateTime<Utc>,
}

/// Orchestrates one webhook-triggered sync: token -> fetch -> write.
pub struct SyncService {
    strava: StravaClient,
    /// Credentials from configuration; the access token inside is empty
    /// and only ever filled on refreshed copies.
    base_tokens: TokenSet,
    writer: Arc<dyn WriteActivities>,
    token_cache: RwLock<Option<CachedTokens>>,
}

impl SyncService {
    pub fn new(
        strava: StravaClient,
        base_tokens: TokenSet,
        writer: Arc<dyn WriteActivities>,
    ) -> Self {
        Self {
            strava,
            base_tokens,
            writer,
            token_cache: RwLock::new(None),
        }
    }

    /// Token set with a valid access token, refreshing when the cached one
    /// is missing or expires within the margin.
    ///
    /// Concurrent invocations may occasionally both refresh; Strava
    /// returns a valid token to each, so the last write simply wins.
    async fn valid_tokens(&self) -> Result<TokenSet, AppError> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        if let Some(cached) = self.token_cache.read().await.as_ref() {
            if now + margin < cached.expires_at {
                return Ok(cached.tokens.clone());
            }
        }

        let refreshed = self.strava.refresh_tokens(&self.base_tokens).await?;

        if let Some(expires_at) = refreshed.expires_at {
            *self.token_cache.write().await = Some(CachedTokens {
                tokens: refreshed.tokens.clone(),
                expires_at,
            });
        }

        Ok(refreshed.tokens)
    }

    /// Sync one activity from Strava into the warehouse activities table.
    ///
    /// Any failure propagates to the caller; a successful fetch followed
    /// by a failed write is not rolled back or replayed.
    pub async fn run(&self, activity_id: u64) -> Result<(), AppError> {
        let tokens = self.valid_tokens().await?;

        let activity = self.strava.get_activity(&tokens, activity_id).await?;

        self.writer.write_activity(&activity).await?;

        tracing::info!(activity_id, "Activity synced");
        Ok(())
    }
}
