// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wagergenie.toml` > `~/.config/wagergenie/wagergenie.toml`
//! > `/etc/wagergenie/wagergenie.toml`, the hosted project's conventional
//! `SUPABASE_*` variables, and `WAGERGENIE_*` overrides.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GenieConfig;

/// Top-level sections, used to split `WAGERGENIE_<SECTION>_<KEY>`.
const SECTIONS: [&str; 5] = ["app", "server", "provider", "chat", "dashboard"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wagergenie/wagergenie.toml` (system-wide)
/// 3. `~/.config/wagergenie/wagergenie.toml` (user XDG config)
/// 4. `./wagergenie.toml` (local directory)
/// 5. `NEXT_PUBLIC_SUPABASE_*`, then `SUPABASE_*`
/// 6. `WAGERGENIE_*` environment variables
pub fn load_config() -> Result<GenieConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GenieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GenieConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GenieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GenieConfig::default()))
        .merge(Toml::file(path))
        .merge(supabase_env_provider("NEXT_PUBLIC_"))
        .merge(supabase_env_provider(""))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GenieConfig::default()))
        .merge(Toml::file("/etc/wagergenie/wagergenie.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wagergenie/wagergenie.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wagergenie.toml"))
        .merge(supabase_env_provider("NEXT_PUBLIC_"))
        .merge(supabase_env_provider(""))
        .merge(env_provider())
}

/// `WAGERGENIE_*` variables, mapped section-first.
///
/// Only the leading section name is split off, so `WAGERGENIE_CHAT_APP_REPLY`
/// maps to `chat.app_reply` and `WAGERGENIE_PROVIDER_ANON_KEY` to
/// `provider.anon_key`.
fn env_provider() -> Env {
    Env::prefixed("WAGERGENIE_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        map_section_key(&key_str).into()
    })
}

/// Split `<section>_<rest>` into `<section>.<rest>` for a known section.
pub(crate) fn map_section_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// The hosted project's own variable names, optionally with a prefix such
/// as `NEXT_PUBLIC_`.
fn supabase_env_provider(prefix: &'static str) -> Env {
    Env::prefixed(prefix)
        .filter(|key| {
            let k = key.as_str().to_ascii_lowercase();
            k == "supabase_url" || k == "supabase_anon_key"
        })
        .map(|key| {
            match key.as_str().to_ascii_lowercase().as_str() {
                "supabase_url" => "provider.url",
                _ => "provider.anon_key",
            }
            .into()
        })
}
