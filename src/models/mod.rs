// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod token;
pub mod webhook;

pub use activity::Activity;
pub use token::TokenSet;
pub use webhook::{AspectType, WebhookEvent};
