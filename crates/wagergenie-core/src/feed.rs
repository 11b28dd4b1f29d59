// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning provider reads into what a view displays.
//!
//! A failed read and an empty read are both answered with the built-in
//! sample set; neither is surfaced as an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GenieError;
use crate::samples;
use crate::types::{ChatMessage, Pick, PickResult};

/// Where the displayed rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Remote,
    Sample,
}

/// Picks ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct PickFeed {
    pub picks: Vec<Pick>,
    pub source: FeedSource,
}

impl PickFeed {
    /// Resolve a table read into a feed, falling back to the sample picks.
    pub fn resolve(
        fetched: Result<Vec<serde_json::Value>, GenieError>,
        now: DateTime<Utc>,
    ) -> Self {
        match decode_rows::<Pick>("picks", fetched) {
            Some(picks) => Self {
                picks,
                source: FeedSource::Remote,
            },
            None => Self {
                picks: samples::sample_picks(now),
                source: FeedSource::Sample,
            },
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_picks(&self.picks)
    }
}

/// Chat history ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct MessageFeed {
    pub messages: Vec<ChatMessage>,
    pub source: FeedSource,
}

impl MessageFeed {
    /// Resolve a table read into a feed, falling back to the sample messages.
    pub fn resolve(
        fetched: Result<Vec<serde_json::Value>, GenieError>,
        now: DateTime<Utc>,
    ) -> Self {
        match decode_rows::<ChatMessage>("messages", fetched) {
            Some(messages) => Self {
                messages,
                source: FeedSource::Remote,
            },
            None => Self {
                messages: samples::sample_messages(now),
                source: FeedSource::Sample,
            },
        }
    }
}

/// Decode rows in order, skipping rows that do not fit `T`.
///
/// `None` means "use samples": the read failed, returned nothing, or
/// nothing survived decoding.
fn decode_rows<T: DeserializeOwned>(
    table: &str,
    fetched: Result<Vec<serde_json::Value>, GenieError>,
) -> Option<Vec<T>> {
    let rows = match fetched {
        Ok(rows) => rows,
        Err(e) => {
            warn!(table, error = %e, "read failed, using sample data");
            return None;
        }
    };

    if rows.is_empty() {
        debug!(table, "no rows, using sample data");
        return None;
    }

    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(table, error = %e, "skipping malformed row");
                None
            }
        })
        .collect();

    if decoded.is_empty() {
        warn!(table, total, "no row could be decoded, using sample data");
        return None;
    }
    Some(decoded)
}

/// Summary figures shown above the pick list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Mean confidence rounded to the nearest integer, 0 for no picks.
    pub average_confidence: u8,
    /// Wins over settled picks as a rounded percentage; `None` until
    /// at least one pick has settled.
    pub win_rate: Option<u8>,
}

impl DashboardStats {
    pub fn from_picks(picks: &[Pick]) -> Self {
        let total = picks.len();
        let average_confidence = if total == 0 {
            0
        } else {
            let sum: u64 = picks.iter().map(|p| u64::from(p.confidence)).sum();
            (sum as f64 / total as f64).round() as u8
        };

        let wins = picks.iter().filter(|p| p.result == PickResult::Win).count();
        let losses = picks.iter().filter(|p| p.result == PickResult::Loss).count();
        let settled = wins + losses;
        let win_rate =
            (settled > 0).then(|| ((wins as f64 / settled as f64) * 100.0).round() as u8);

        Self {
            total,
            average_confidence,
            win_rate,
        }
    }
}
