// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BigQuery client wrapper with typed operations.
//!
//! Thin REST adapter over the `tabledata.insertAll` and `tables.insert`
//! endpoints. Bearer tokens come from the Cloud Run metadata server and
//! are cached in memory until shortly before expiry.

use crate::db::{schema, WriteActivities, ACTIVITIES_TABLE};
use crate::error::AppError;
use crate::models::Activity;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

const BIGQUERY_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Margin before access-token expiry when we fetch a fresh one.
const TOKEN_MARGIN_SECS: i64 = 60;

/// Access token minted by the metadata server.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    /// Seconds until expiry
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// BigQuery writer for the activities table.
pub struct BigQueryWriter {
    http: reqwest::Client,
    project_id: String,
    dataset: String,
    base_url: String,
    token_url: String,
    token_cache: RwLock<Option<CachedToken>>,
}

impl BigQueryWriter {
    /// Create a writer against the production BigQuery endpoints.
    pub fn new(project_id: &str, dataset: &str) -> Self {
        Self::with_endpoints(project_id, dataset, BIGQUERY_BASE_URL, METADATA_TOKEN_URL)
    }

    /// Create a writer with explicit endpoints (emulator or tests).
    pub fn with_endpoints(
        project_id: &str,
        dataset: &str,
        base_url: &str,
        token_url: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            token_cache: RwLock::new(None),
        }
    }

    /// Bearer token for BigQuery calls, fetched from the metadata server
    /// and cached until near expiry.
    async fn access_token(&self) -> Result<String, AppError> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_MARGIN_SECS);

        if let Some(cached) = self.token_cache.read().await.as_ref() {
            if now + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self
            .http
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("metadata token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "metadata token request returned HTTP {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("invalid metadata token response: {e}")))?;

        let expires_at = now + Duration::seconds(token.expires_in);
        *self.token_cache.write().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    fn table_url(&self, suffix: &str) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables{}",
            self.base_url, self.project_id, self.dataset, suffix
        )
    }
}

/// Row-level errors in an otherwise-200 insertAll response.
#[derive(Debug, Deserialize)]
struct InsertAllResponse {
    #[serde(default, rename = "insertErrors")]
    insert_errors: Vec<serde_json::Value>,
}

#[async_trait::async_trait]
impl WriteActivities for BigQueryWriter {
    async fn write_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let url = self.table_url(&format!("/{ACTIVITIES_TABLE}/insertAll"));

        let body = json!({
            "rows": [{ "json": activity.to_row()? }]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("insertAll request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "insertAll returned HTTP {status}: {body}"
            )));
        }

        // insertAll reports row-level failures in a 200 response.
        let parsed: InsertAllResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("invalid insertAll response: {e}")))?;

        if !parsed.insert_errors.is_empty() {
            return Err(AppError::Storage(format!(
                "insertAll row errors: {:?}",
                parsed.insert_errors
            )));
        }

        tracing::info!(
            activity_id = activity.id,
            dataset = %self.dataset,
            table = ACTIVITIES_TABLE,
            "Inserted activity row"
        );
        Ok(())
    }

    async fn create_activities_table(&self) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let url = self.table_url("");

        let body = json!({
            "tableReference": {
                "projectId": self.project_id,
                "datasetId": self.dataset,
                "tableId": ACTIVITIES_TABLE,
            },
            "schema": { "fields": schema::activity_table_schema() },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("tables.insert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "tables.insert returned HTTP {status}: {body}"
            )));
        }

        tracing::info!(
            dataset = %self.dataset,
            table = ACTIVITIES_TABLE,
            "Created activities table"
        );
        Ok(())
    }
}
