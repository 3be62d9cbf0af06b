// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BigQuery schema for the activities table.
//!
//! Mirrors the activity model field for field: nested records become
//! RECORD columns, lists become REPEATED, optional scalars NULLABLE.

use serde_json::{json, Value};

const INTEGER: &str = "INTEGER";
const STRING: &str = "STRING";
const FLOAT: &str = "FLOAT";
const BOOLEAN: &str = "BOOLEAN";
const TIMESTAMP: &str = "TIMESTAMP";
const JSON_TYPE: &str = "JSON";

fn field(name: &str, field_type: &str, mode: &str) -> Value {
    json!({ "name": name, "type": field_type, "mode": mode })
}

fn required(name: &str, field_type: &str) -> Value {
    field(name, field_type, "REQUIRED")
}

fn nullable(name: &str, field_type: &str) -> Value {
    field(name, field_type, "NULLABLE")
}

fn repeated(name: &str, field_type: &str) -> Value {
    field(name, field_type, "REPEATED")
}

fn record(name: &str, mode: &str, fields: Vec<Value>) -> Value {
    json!({ "name": name, "type": "RECORD", "mode": mode, "fields": fields })
}

fn meta_athlete_fields() -> Vec<Value> {
    vec![required("id", INTEGER), required("resource_state", INTEGER)]
}

fn meta_activity_fields() -> Vec<Value> {
    vec![required("id", INTEGER), required("resource_state", INTEGER)]
}

fn summary_segment_fields() -> Vec<Value> {
    vec![
        required("id", INTEGER),
        required("resource_state", INTEGER),
        required("name", STRING),
        required("activity_type", STRING),
        required("distance", FLOAT),
        required("average_grade", FLOAT),
        required("maximum_grade", FLOAT),
        required("elevation_high", FLOAT),
        required("elevation_low", FLOAT),
        repeated("start_latlng", FLOAT),
        repeated("end_latlng", FLOAT),
        required("climb_category", INTEGER),
        nullable("city", STRING),
        nullable("state", STRING),
        nullable("country", STRING),
        required("private", BOOLEAN),
        required("hazardous", BOOLEAN),
        required("starred", BOOLEAN),
    ]
}

fn segment_effort_fields() -> Vec<Value> {
    vec![
        required("id", INTEGER),
        required("resource_state", INTEGER),
        required("name", STRING),
        record("activity", "REQUIRED", meta_activity_fields()),
        record("athlete", "REQUIRED", meta_athlete_fields()),
        required("elapsed_time", INTEGER),
        required("moving_time", INTEGER),
        required("start_date", TIMESTAMP),
        required("start_date_local", TIMESTAMP),
        required("distance", FLOAT),
        required("start_index", INTEGER),
        required("end_index", INTEGER),
        nullable("average_cadence", FLOAT),
        nullable("device_watts", BOOLEAN),
        nullable("average_watts", FLOAT),
        record("segment", "NULLABLE", summary_segment_fields()),
        nullable("kom_rank", INTEGER),
        nullable("pr_rank", INTEGER),
        nullable("hidden", BOOLEAN),
    ]
}

fn split_fields() -> Vec<Value> {
    vec![
        required("distance", FLOAT),
        required("elapsed_time", INTEGER),
        nullable("elevation_difference", FLOAT),
        required("moving_time", INTEGER),
        required("split", INTEGER),
        required("average_speed", FLOAT),
        required("pace_zone", INTEGER),
    ]
}

fn lap_fields() -> Vec<Value> {
    vec![
        required("id", INTEGER),
        required("resource_state", INTEGER),
        required("name", STRING),
        record("activity", "REQUIRED", meta_activity_fields()),
        record("athlete", "REQUIRED", meta_athlete_fields()),
        required("elapsed_time", INTEGER),
        required("moving_time", INTEGER),
        required("start_date", TIMESTAMP),
        required("start_date_local", TIMESTAMP),
        required("distance", FLOAT),
        required("start_index", INTEGER),
        required("end_index", INTEGER),
        nullable("total_elevation_gain", FLOAT),
        required("average_speed", FLOAT),
        required("max_speed", FLOAT),
        nullable("average_cadence", FLOAT),
        nullable("device_watts", BOOLEAN),
        nullable("average_watts", FLOAT),
        required("lap_index", INTEGER),
        required("split", INTEGER),
    ]
}

fn polyline_map_fields() -> Vec<Value> {
    vec![
        required("id", STRING),
        required("polyline", STRING),
        required("resource_state", INTEGER),
        required("summary_polyline", STRING),
    ]
}

fn photo_summary_fields() -> Vec<Value> {
    vec![
        record(
            "primary",
            "NULLABLE",
            vec![
                nullable("id", STRING),
                nullable("media_type", INTEGER),
                required("source", INTEGER),
                required("unique_id", STRING),
                field("urls", JSON_TYPE, "REQUIRED"),
            ],
        ),
        required("count", INTEGER),
    ]
}

fn summary_gear_fields() -> Vec<Value> {
    vec![
        required("id", STRING),
        required("primary", BOOLEAN),
        required("name", STRING),
        required("resource_state", INTEGER),
        required("distance", FLOAT),
    ]
}

fn stats_visibility_fields() -> Vec<Value> {
    vec![required("type", STRING), required("visibility", STRING)]
}

/// Column list for the activities table.
pub fn activity_table_schema() -> Vec<Value> {
    vec![
        required("id", INTEGER),
        nullable("external_id", STRING),
        nullable("upload_id", INTEGER),
        record("athlete", "REQUIRED", meta_athlete_fields()),
        required("name", STRING),
        required("distance", FLOAT),
        required("moving_time", INTEGER),
        required("elapsed_time", INTEGER),
        required("total_elevation_gain", FLOAT),
        nullable("elev_high", FLOAT),
        nullable("elev_low", FLOAT),
        required("type", STRING),
        required("sport_type", STRING),
        required("start_date", TIMESTAMP),
        required("start_date_local", TIMESTAMP),
        required("timezone", STRING),
        repeated("start_latlng", FLOAT),
        repeated("end_latlng", FLOAT),
        required("achievement_count", INTEGER),
        required("kudos_count", INTEGER),
        required("comment_count", INTEGER),
        required("athlete_count", INTEGER),
        required("photo_count", INTEGER),
        required("total_photo_count", INTEGER),
        record("map", "REQUIRED", polyline_map_fields()),
        required("trainer", BOOLEAN),
        required("commute", BOOLEAN),
        required("manual", BOOLEAN),
        required("private", BOOLEAN),
        required("flagged", BOOLEAN),
        nullable("workout_type", INTEGER),
        nullable("upload_id_str", STRING),
        required("average_speed", FLOAT),
        required("max_speed", FLOAT),
        required("has_kudoed", BOOLEAN),
        required("hide_from_home", BOOLEAN),
        nullable("gear_id", STRING),
        nullable("kilojoules", FLOAT),
        nullable("average_watts", FLOAT),
        nullable("device_watts", BOOLEAN),
        nullable("max_watts", INTEGER),
        nullable("weighted_average_watts", INTEGER),
        nullable("description", STRING),
        record("photos", "REQUIRED", photo_summary_fields()),
        record("gear", "NULLABLE", summary_gear_fields()),
        required("calories", FLOAT),
        record("segment_efforts", "REPEATED", segment_effort_fields()),
        nullable("device_name", STRING),
        required("embed_token", STRING),
        record("splits_metric", "REPEATED", split_fields()),
        record("splits_standard", "REPEATED", split_fields()),
        record("laps", "REPEATED", lap_fields()),
        record("best_efforts", "REPEATED", segment_effort_fields()),
        // Not part of the documented DetailedActivity model
        nullable("average_cadence", FLOAT),
        required("has_heartrate", BOOLEAN),
        required("pr_count", INTEGER),
        nullable("suffer_score", FLOAT),
        record("stats_visibility", "REPEATED", stats_visibility_fields()),
        nullable("display_hide_heartrate_option", BOOLEAN),
        nullable("heartrate_opt_out", BOOLEAN),
        nullable("average_heartrate", FLOAT),
        nullable("max_heartrate", FLOAT),
        repeated("available_zones", STRING),
        nullable("visibility", STRING),
    ]
}
