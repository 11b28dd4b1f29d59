// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for WagerGenie.
//!
//! This crate provides the error type, the domain types shared by every
//! view (sessions, picks, chat messages, preferences), and the provider
//! traits the gateway is written against. Concrete providers live in
//! `wagergenie-supabase`; in-memory doubles live in `wagergenie-test-utils`.

pub mod error;
pub mod feed;
pub mod samples;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GenieError;
pub use feed::{DashboardStats, FeedSource, MessageFeed, PickFeed};
pub use types::{
    AdapterType, ChatMessage, ChatRole, HealthStatus, Pick, PickResult, RiskTolerance, Session,
    SessionEvent, SessionTokens, SessionUser, UserPreferences,
};

pub use traits::{ChatResponder, DataProvider, PluginAdapter, SessionProvider};
