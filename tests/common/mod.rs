// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: a recording warehouse writer and a local stub of
//! the Strava API.

// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strava_bq_sync::config::Config;
use strava_bq_sync::db::WriteActivities;
use strava_bq_sync::error::AppError;
use strava_bq_sync::models::Activity;
use strava_bq_sync::retry::RetryPolicy;
use strava_bq_sync::services::{StravaClient, SyncService};
use strava_bq_sync::AppState;

pub const FIXTURE: &str = include_str!("../fixtures/activity.json");
pub const FIXTURE_ACTIVITY_ID: u64 = 8726373550;

// ─── Recording warehouse writer ──────────────────────────────────────────

/// In-memory stand-in for the BigQuery writer.
#[derive(Default)]
pub struct RecordingWriter {
    pub written: Mutex<Vec<Activity>>,
    pub tables_created: AtomicU32,
    fail_writes: bool,
}

impl RecordingWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Writer whose write_activity always fails with a storage error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_writes: true,
            ..Self::default()
        })
    }

    pub fn written_ids(&self) -> Vec<u64> {
        self.written
            .lock()
            .expect("writer lock")
            .iter()
            .map(|a| a.id)
            .collect()
    }
}

#[async_trait::async_trait]
impl WriteActivities for RecordingWriter {
    async fn write_activity(&self, activity: &Activity) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::Storage("stub insert failure".to_string()));
        }
        self.written
            .lock()
            .expect("writer lock")
            .push(activity.clone());
        Ok(())
    }

    async fn create_activities_table(&self) -> Result<(), AppError> {
        self.tables_created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ─── Strava API stub ─────────────────────────────────────────────────────

/// Scripted stub behavior.
#[derive(Clone)]
pub struct StubBehavior {
    /// Status for the token endpoint (200 serves a valid token response).
    pub token_status: u16,
    /// Status per activity call, in order; the last entry repeats. 200
    /// serves the activity fixture, 429 carries `Retry-After: 0`.
    pub activity_statuses: Vec<u16>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            token_status: 200,
            activity_statuses: vec![200],
        }
    }
}

struct StubState {
    behavior: StubBehavior,
    token_calls: AtomicU32,
    activity_calls: AtomicU32,
}

/// Handle to a running Strava API stub.
pub struct StravaStub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StravaStub {
    pub fn token_calls(&self) -> u32 {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn activity_calls(&self) -> u32 {
        self.state.activity_calls.load(Ordering::SeqCst)
    }
}

async fn token_handler(State(state): State<Arc<StubState>>) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    if state.behavior.token_status == 200 {
        Json(json!({
            "access_token": "stub-access-token",
            "refresh_token": "stub-refresh-token",
            "expires_at": chrono::Utc::now().timestamp() + 21_600,
        }))
        .into_response()
    } else {
        status_response(state.behavior.token_status)
    }
}

async fn activity_handler(
    State(state): State<Arc<StubState>>,
    Path(_id): Path<u64>,
) -> Response {
    let call = state.activity_calls.fetch_add(1, Ordering::SeqCst) as usize;
    let statuses = &state.behavior.activity_statuses;
    let status = statuses
        .get(call)
        .or_else(|| statuses.last())
        .copied()
        .unwrap_or(200);

    if status == 200 {
        let body: serde_json::Value = serde_json::from_str(FIXTURE).expect("valid fixture");
        Json(body).into_response()
    } else {
        status_response(status)
    }
}

fn status_response(status: u16) -> Response {
    let code = StatusCode::from_u16(status).expect("valid status");
    if status == 429 {
        (code, [("Retry-After", "0")], "rate limited").into_response()
    } else {
        (code, "stub error").into_response()
    }
}

/// Spawn a stub Strava API on an ephemeral local port.
pub async fn spawn_strava_stub(behavior: StubBehavior) -> StravaStub {
    let state = Arc::new(StubState {
        behavior,
        token_calls: AtomicU32::new(0),
        activity_calls: AtomicU32::new(0),
    });

    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .route("/api/v3/activities/{id}", get(activity_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    StravaStub {
        base_url: format!("http://{addr}"),
        state,
    }
}

// ─── App construction ────────────────────────────────────────────────────

/// Test config pointing the Strava endpoints at the stub, with backoffs
/// shortened so retry scenarios finish quickly.
pub fn test_config(stub_base_url: &str) -> Config {
    let mut config = Config::test_default();
    config.strava_api.token_url = format!("{stub_base_url}/oauth/token");
    config.strava_api.api_base_url = format!("{stub_base_url}/api/v3");
    config.strava_api.token_retry = RetryPolicy::new(2, Duration::from_millis(10));
    config.strava_api.activity_retry = RetryPolicy::new(3, Duration::from_millis(10));
    config
}

/// Sync pipeline wired to the stub and the given writer.
pub fn build_sync(config: &Config, writer: Arc<RecordingWriter>) -> SyncService {
    let strava = StravaClient::new(config.strava_api.clone()).expect("client");
    SyncService::new(strava, config.tokens(), writer)
}

/// Full test app (router + state) against the stub.
pub fn create_test_app(config: Config, writer: Arc<RecordingWriter>) -> axum::Router {
    let sync = build_sync(&config, writer);
    let state = Arc::new(AppState { config, sync });
    strava_bq_sync::routes::create_router(state)
}
