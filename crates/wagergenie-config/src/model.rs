// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for WagerGenie.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level WagerGenie configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section defaults except `[provider]`, whose URL and key must be supplied.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenieConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Hosted auth/database project settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chat stub settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Dashboard view settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name used in page titles.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "WagerGenie".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Mark session cookies `Secure`. Enable behind TLS.
    #[serde(default)]
    pub secure_cookies: bool,

    /// Externally visible base URL, used to build magic-link redirects.
    /// Falls back to the request's `Host` header when unset.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secure_cookies: false,
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Hosted auth/database project configuration.
///
/// Both `url` and `anon_key` are required; they have no compiled defaults.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Public (anon) API key.
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[redacted]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Chat stub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Delay before the canned assistant reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Reply used on `/app/chat`.
    #[serde(default = "default_app_reply")]
    pub app_reply: String,

    /// Reply used on the `/genie` chat tab.
    #[serde(default = "default_genie_reply")]
    pub genie_reply: String,

    /// Reply appended when the responder fails.
    #[serde(default = "default_error_reply")]
    pub error_reply: String,

    /// Write `/genie` chat exchanges to the `messages` table (best effort).
    #[serde(default = "default_persist_genie_messages")]
    pub persist_genie_messages: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            app_reply: default_app_reply(),
            genie_reply: default_genie_reply(),
            error_reply: default_error_reply(),
            persist_genie_messages: default_persist_genie_messages(),
        }
    }
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_app_reply() -> String {
    "I am WagerGenie, your AI betting assistant. How can I help you today?".to_string()
}

fn default_genie_reply() -> String {
    "I'm analyzing the latest data for your request. I'll have a detailed prediction ready shortly! \u{1F9DE}\u{200D}\u{2642}\u{FE0F}".to_string()
}

fn default_persist_genie_messages() -> bool {
    true
}

fn default_error_reply() -> String {
    "Sorry, I encountered an error. Please try again.".to_string()
}

/// Dashboard view configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Maximum number of recent picks fetched for the dashboard.
    #[serde(default = "default_picks_limit")]
    pub picks_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            picks_limit: default_picks_limit(),
        }
    }
}

fn default_picks_limit() -> usize {
    10
}
