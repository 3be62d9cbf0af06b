// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava webhook event envelope.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of change a webhook event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Create,
    Update,
    Delete,
}

/// Event pushed by Strava when an activity or athlete changes.
///
/// Only `aspect_type == create` for activity objects triggers a sync; the
/// rest are acknowledged and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub aspect_type: AspectType,
    /// Event timestamp (Unix epoch seconds)
    pub event_time: i64,
    /// Activity ID for activity events, athlete ID for athlete events
    pub object_id: u64,
    /// "activity" or "athlete"
    pub object_type: String,
    /// Athlete owning the object
    pub owner_id: u64,
    pub subscription_id: u64,
    /// Changed fields on update events (e.g. {"title": "..."}); empty for
    /// create events
    #[serde(default)]
    pub updates: HashMap<String, String>,
}

impl WebhookEvent {
    /// Parse an event from the inbound webhook body.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(raw).map_err(|e| AppError::Validation(e.to_string()))
    }
}
