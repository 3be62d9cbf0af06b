// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava activity model, mirroring the DetailedActivity API shape plus a
//! handful of undocumented fields Strava actually sends.
//!
//! https://developers.strava.com/docs/reference/#api-models-DetailedActivity
//!
//! Parsing rules:
//! - unknown input fields are ignored (upstream adds fields regularly)
//! - absent list fields normalize to empty vectors, never null
//! - optional scalars stay `Option` so presence round-trips into storage

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Athlete reference (id only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaAthlete {
    pub id: u64,
    pub resource_state: i64,
}

/// Activity reference (id only), used inside efforts and laps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaActivity {
    pub id: u64,
    pub resource_state: i64,
}

/// Encoded route polylines for an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineMap {
    pub id: String,
    pub polyline: String,
    pub resource_state: i64,
    pub summary_polyline: String,
}

/// Segment description embedded in a segment effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySegment {
    pub id: u64,
    pub resource_state: i64,
    pub name: String,
    pub activity_type: String,
    pub distance: f64,
    pub average_grade: f64,
    pub maximum_grade: f64,
    pub elevation_high: f64,
    pub elevation_low: f64,
    #[serde(default)]
    pub start_latlng: Vec<f64>,
    #[serde(default)]
    pub end_latlng: Vec<f64>,
    pub climb_category: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub private: bool,
    pub hazardous: bool,
    pub starred: bool,
}

/// One attempt at a segment within the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentEffort {
    pub id: u64,
    pub resource_state: i64,
    pub name: String,
    pub activity: MetaActivity,
    pub athlete: MetaAthlete,
    pub elapsed_time: i64,
    pub moving_time: i64,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    pub distance: f64,
    pub start_index: i64,
    pub end_index: i64,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub device_watts: Option<bool>,
    #[serde(default)]
    pub average_watts: Option<f64>,
    pub segment: SummarySegment,
    /// Rank on the segment leaderboard, when in the top 10
    pub kom_rank: Option<i64>,
    /// Personal-record rank, when in the athlete's top 3
    pub pr_rank: Option<i64>,
    pub hidden: bool,
}

/// Per-kilometer or per-mile split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub distance: f64,
    pub elapsed_time: i64,
    #[serde(default)]
    pub elevation_difference: Option<f64>,
    pub moving_time: i64,
    pub split: i64,
    pub average_speed: f64,
    pub pace_zone: i64,
}

/// One lap of the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub id: u64,
    pub resource_state: i64,
    pub name: String,
    pub activity: MetaActivity,
    pub athlete: MetaAthlete,
    pub elapsed_time: i64,
    pub moving_time: i64,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    pub distance: f64,
    pub start_index: i64,
    pub end_index: i64,
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    pub average_speed: f64,
    pub max_speed: f64,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub device_watts: Option<bool>,
    #[serde(default)]
    pub average_watts: Option<f64>,
    pub lap_index: i64,
    pub split: i64,
}

/// Gear (bike/shoes) used for the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGear {
    pub id: String,
    pub primary: bool,
    pub name: String,
    pub resource_state: i64,
    pub distance: f64,
}

/// Highlight photo of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPhoto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub media_type: Option<i64>,
    pub source: i64,
    pub unique_id: String,
    /// Size label -> URL
    pub urls: HashMap<String, String>,
}

/// Photo attachment summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSummary {
    #[serde(default)]
    pub primary: Option<PrimaryPhoto>,
    pub count: i64,
}

/// Per-stat visibility setting (heartrate, pace, power, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsVisibility {
    #[serde(rename = "type")]
    pub stat_type: String,
    pub visibility: String,
}

/// One recorded exercise session, as returned by
/// `GET /activities/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID, the immutable identity of the record
    pub id: u64,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub upload_id: Option<u64>,
    pub athlete: MetaAthlete,
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: i64,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub elev_high: Option<f64>,
    #[serde(default)]
    pub elev_low: Option<f64>,
    /// Deprecated activity type kept for compatibility ("Ride", "Run", ...)
    #[serde(rename = "type")]
    pub activity_type: String,
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    pub timezone: String,
    #[serde(default)]
    pub start_latlng: Vec<f64>,
    #[serde(default)]
    pub end_latlng: Vec<f64>,
    pub achievement_count: i64,
    pub kudos_count: i64,
    pub comment_count: i64,
    /// Number of athletes on a group activity
    pub athlete_count: i64,
    pub photo_count: i64,
    pub total_photo_count: i64,
    pub map: PolylineMap,
    pub trainer: bool,
    pub commute: bool,
    pub manual: bool,
    pub private: bool,
    pub flagged: bool,
    #[serde(default)]
    pub workout_type: Option<i64>,
    #[serde(default)]
    pub upload_id_str: Option<String>,
    /// Meters per second
    pub average_speed: f64,
    pub max_speed: f64,
    pub has_kudoed: bool,
    pub hide_from_home: bool,
    #[serde(default)]
    pub gear_id: Option<String>,
    #[serde(default)]
    pub kilojoules: Option<f64>,
    #[serde(default)]
    pub average_watts: Option<f64>,
    /// Whether watts came from a power meter rather than an estimate
    #[serde(default)]
    pub device_watts: Option<bool>,
    #[serde(default)]
    pub max_watts: Option<i64>,
    #[serde(default)]
    pub weighted_average_watts: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub photos: PhotoSummary,
    #[serde(default)]
    pub gear: Option<SummaryGear>,
    pub calories: f64,
    #[serde(default)]
    pub segment_efforts: Vec<SegmentEffort>,
    /// Device name (e.g. "Garmin Edge 530")
    #[serde(default)]
    pub device_name: Option<String>,
    pub embed_token: String,
    #[serde(default)]
    pub splits_metric: Vec<Split>,
    #[serde(default)]
    pub splits_standard: Vec<Split>,
    #[serde(default)]
    pub laps: Vec<Lap>,
    #[serde(default)]
    pub best_efforts: Vec<SegmentEffort>,

    // Not part of the documented DetailedActivity model
    #[serde(default)]
    pub average_cadence: Option<f64>,
    pub has_heartrate: bool,
    pub pr_count: i64,
    #[serde(default)]
    pub suffer_score: Option<f64>,
    #[serde(default)]
    pub stats_visibility: Vec<StatsVisibility>,
    #[serde(default)]
    pub display_hide_heartrate_option: Option<bool>,
    #[serde(default)]
    pub heartrate_opt_out: Option<bool>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub available_zones: Vec<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

impl Activity {
    /// Parse an activity document from a Strava API response body.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Flat row shape handed to the warehouse writer.
    pub fn to_row(&self) -> Result<serde_json::Value, AppError> {
        serde_json::to_value(self).map_err(|e| AppError::Validation(e.to_string()))
    }
}
