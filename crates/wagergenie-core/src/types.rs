// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the providers, the chat stub, and the gateway.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::error::GenieError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Session,
    Data,
    /// One adapter serving both the session and the data role.
    SessionAndData,
    Responder,
}

// --- Sessions ---

/// The authenticated user attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    /// Free-form user metadata as stored by the identity provider.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A session issued by the identity provider.
///
/// Owned and mutated only by the provider; the application reads it.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: SessionUser,
}

impl Session {
    /// Whether the session has passed its expiry at `now`.
    ///
    /// Sessions without an expiry never expire on their own.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// The tokens a browser would carry for this session.
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Tokens carried by the browser in cookies.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

/// Session change notification broadcast by a session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: String },
    SignedOut { user_id: String },
    TokenRefreshed { user_id: String },
}

impl SessionEvent {
    pub fn user_id(&self) -> &str {
        match self {
            SessionEvent::SignedIn { user_id }
            | SessionEvent::SignedOut { user_id }
            | SessionEvent::TokenRefreshed { user_id } => user_id,
        }
    }

    /// Whether this event ends the session it refers to.
    pub fn invalidates(&self) -> bool {
        matches!(self, SessionEvent::SignedOut { .. })
    }
}

/// Metadata attached to a new account at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub username: String,
    pub plan: String,
}

impl SignUpMetadata {
    /// Derive metadata from an email: the username is the local part and
    /// every new account starts on the free plan.
    pub fn from_email(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or_default().to_string();
        Self {
            username,
            plan: "free".to_string(),
        }
    }
}

/// Result of a sign-up call.
///
/// Providers that require email confirmation return a user without a
/// session; providers with auto-confirm return both.
#[derive(Debug, Clone, Default)]
pub struct SignUpOutcome {
    pub user: Option<SessionUser>,
    pub session: Option<Session>,
}

/// The kind of one-time token being verified on the auth callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    Magiclink,
    Signup,
    Email,
    Recovery,
    Invite,
}

// --- Picks ---

/// Settlement state of a pick.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PickResult {
    Win,
    Loss,
    #[default]
    Pending,
}

/// A recorded betting recommendation.
///
/// Rows come from two historical table shapes, so `match`, `prediction`
/// and `date` fall back to `question`, `answer` and `created_at` when
/// absent. A row may carry both names of a pair; the first one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PickRow")]
pub struct Pick {
    pub id: String,
    pub sport: String,
    #[serde(rename = "match")]
    pub matchup: String,
    pub prediction: String,
    pub confidence: u8,
    pub result: PickResult,
    pub explanation: String,
    pub date: String,
}

/// Table row as stored, before the column fallbacks are applied.
#[derive(Deserialize)]
struct PickRow {
    #[serde(deserialize_with = "de_id")]
    id: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    sport: String,
    #[serde(rename = "match", default)]
    matchup: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(deserialize_with = "de_confidence", default)]
    confidence: u8,
    #[serde(deserialize_with = "de_result", default)]
    result: PickResult,
    #[serde(default, deserialize_with = "de_opt_string")]
    explanation: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<PickRow> for Pick {
    fn from(row: PickRow) -> Self {
        Self {
            id: row.id,
            sport: row.sport,
            matchup: row.matchup.or(row.question).unwrap_or_default(),
            prediction: row.prediction.or(row.answer).unwrap_or_default(),
            confidence: row.confidence,
            result: row.result,
            explanation: row.explanation,
            date: row.date.or(row.created_at).unwrap_or_default(),
        }
    }
}

impl Pick {
    /// Short calendar date for display, or the raw value if it is not RFC 3339.
    pub fn display_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.date) {
            Ok(dt) => dt.format("%b %-d, %Y").to_string(),
            Err(_) => self.date.clone(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

fn de_confidence<'de, D: Deserializer<'de>>(de: D) -> Result<u8, D::Error> {
    let raw = Option::<f64>::deserialize(de)?.unwrap_or(0.0);
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

fn de_result<'de, D: Deserializer<'de>>(de: D) -> Result<PickResult, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw
        .and_then(|s| s.parse::<PickResult>().ok())
        .unwrap_or_default())
}

fn de_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

// --- Chat ---

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat message.
///
/// Stored rows may carry `created_at` next to, or instead of, `timestamp`;
/// `timestamp` wins when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MessageRow")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct MessageRow {
    #[serde(deserialize_with = "de_id")]
    id: String,
    role: ChatRole,
    content: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = String;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let timestamp = row
            .timestamp
            .or(row.created_at)
            .ok_or_else(|| "missing field `timestamp`".to_string())?;
        Ok(Self {
            id: row.id,
            role: row.role,
            content: row.content,
            timestamp,
        })
    }
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// --- Preferences ---

/// Sports a user can mark as favourites.
pub const SPORTS: [&str; 6] = ["NFL", "NBA", "MLB", "NHL", "Soccer", "UFC"];

/// How aggressive the user wants recommendations to be.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Low,
        RiskTolerance::Medium,
        RiskTolerance::High,
    ];

    /// Label shown in the settings form.
    pub fn label(self) -> &'static str {
        match self {
            RiskTolerance::Low => "Conservative",
            RiskTolerance::Medium => "Moderate",
            RiskTolerance::High => "Aggressive",
        }
    }
}

/// Per-user display and notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub risk_tolerance: RiskTolerance,
    pub favorite_sports: BTreeSet<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            risk_tolerance: RiskTolerance::Medium,
            favorite_sports: BTreeSet::new(),
        }
    }
}

/// A single field edit from the settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum PreferenceChange {
    EmailNotifications { enabled: bool },
    PushNotifications { enabled: bool },
    RiskTolerance { level: RiskTolerance },
    FavoriteSport { sport: String, selected: bool },
}

impl UserPreferences {
    /// Apply one edit. Sports outside [`SPORTS`] are rejected.
    pub fn apply(&mut self, change: PreferenceChange) -> Result<(), GenieError> {
        match change {
            PreferenceChange::EmailNotifications { enabled } => self.email_notifications = enabled,
            PreferenceChange::PushNotifications { enabled } => self.push_notifications = enabled,
            PreferenceChange::RiskTolerance { level } => self.risk_tolerance = level,
            PreferenceChange::FavoriteSport { sport, selected } => {
                let Some(known) = SPORTS.iter().find(|s| s.eq_ignore_ascii_case(&sport)) else {
                    return Err(GenieError::InvalidInput(format!("unknown sport `{sport}`")));
                };
                if selected {
                    self.favorite_sports.insert((*known).to_string());
                } else {
                    self.favorite_sports.remove(*known);
                }
            }
        }
        Ok(())
    }
}

// --- Data queries ---

/// A bounded, ordered, filtered read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    /// Equality filters as `(column, value)` pairs.
    pub filters: Vec<(String, String)>,
    /// Order column and direction (`true` = ascending).
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
