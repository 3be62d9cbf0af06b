// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! strava-bq-sync API server
//!
//! Receives Strava webhook events and syncs newly created activities into
//! the BigQuery activities table.

use std::sync::Arc;
use strava_bq_sync::{
    config::Config,
    db::{BigQueryWriter, WriteActivities},
    services::{StravaClient, SyncService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting strava-bq-sync API");

    let writer = Arc::new(BigQueryWriter::new(
        &config.gcp_project_id,
        &config.bq_dataset,
    ));

    // One-shot table setup: `strava-bq-sync create-table`
    if std::env::args().nth(1).as_deref() == Some("create-table") {
        writer.create_activities_table().await?;
        tracing::info!(dataset = %config.bq_dataset, "Activities table created");
        return Ok(());
    }

    // Initialize Strava client and sync pipeline
    let strava = StravaClient::new(config.strava_api.clone())?;
    let sync = SyncService::new(strava, config.tokens(), writer);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sync,
    });

    // Build router
    let app = strava_bq_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(
                    "strava_bq_sync=debug"
                        .parse()
                        .expect("valid logging directive"),
                )
                .add_directive("info".parse().expect("valid logging directive")),
        )
        .with(format)
        .init();
}
