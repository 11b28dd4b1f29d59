// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.
//! The provider URL and public key have no defaults, so a config without them
//! never validates.

use crate::diagnostic::ConfigError;
use crate::model::GenieConfig;

/// Upper bound for `dashboard.picks_limit`.
pub const MAX_PICKS_LIMIT: usize = 100;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GenieConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.provider.url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ConfigError::MissingKey {
            key: "provider.url".to_string(),
            env_hint: Some("SUPABASE_URL".to_string()),
        }),
        Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
            errors.push(ConfigError::Validation {
                message: format!("provider.url `{url}` must start with http:// or https://"),
            });
        }
        Some(_) => {}
    }

    if config
        .provider
        .anon_key
        .as_deref()
        .is_none_or(|k| k.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "provider.anon_key".to_string(),
            env_hint: Some("SUPABASE_ANON_KEY".to_string()),
        });
    }

    if let Some(url) = config.server.public_url.as_deref()
        && !(url.starts_with("https://") || url.starts_with("http://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("server.public_url `{url}` must start with http:// or https://"),
        });
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.timeout_secs must be greater than 0".to_string(),
        });
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if !(1..=MAX_PICKS_LIMIT).contains(&config.dashboard.picks_limit) {
        errors.push(ConfigError::Validation {
            message: format!(
                "dashboard.picks_limit must be between 1 and {MAX_PICKS_LIMIT}, got {}",
                config.dashboard.picks_limit
            ),
        });
    }

    let level = config.app.log_level.to_ascii_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` must be one of trace, debug, info, warn, error",
                config.app.log_level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
