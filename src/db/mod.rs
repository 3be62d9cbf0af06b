// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Warehouse layer (BigQuery).

pub mod bigquery;
pub mod schema;

pub use bigquery::BigQueryWriter;

use crate::error::AppError;
use crate::models::Activity;

/// Name of the warehouse table holding synced activities.
pub const ACTIVITIES_TABLE: &str = "activities";

/// Storage sink for normalized activities.
///
/// Object-safe so tests can substitute a recording writer for the real
/// BigQuery client.
#[async_trait::async_trait]
pub trait WriteActivities: Send + Sync {
    /// Insert one activity as a row in the activities table.
    async fn write_activity(&self, activity: &Activity) -> Result<(), AppError>;

    /// Create the activities table with the nested activity schema.
    async fn create_activities_table(&self) -> Result<(), AppError>;
}
