// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth credentials.

/// OAuth credential set for the Strava API.
///
/// Immutable value: a refresh produces a new set wholesale, the old one is
/// never mutated. Held for the duration of one sync operation only and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    /// Strava OAuth application ID
    pub client_id: u64,
    /// Strava OAuth application secret
    pub client_secret: String,
    /// Long-lived refresh token from the initial authorization
    pub refresh_token: String,
    /// Short-lived bearer token; empty until the first refresh
    pub access_token: String,
}

impl TokenSet {
    /// Copy of this set with the access token replaced.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..self.clone()
        }
    }
}
