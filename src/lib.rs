// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! strava-bq-sync: relay Strava webhook events into a BigQuery warehouse.
//!
//! On a "create" webhook event this crate refreshes the Strava OAuth
//! token, fetches the full activity with a retry-aware client, normalizes
//! it through a typed model, and inserts it as one row into the BigQuery
//! activities table.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod retry;
pub mod routes;
pub mod services;

use config::Config;
use services::SyncService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sync: SyncService,
}
