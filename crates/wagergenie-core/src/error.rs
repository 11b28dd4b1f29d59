// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for WagerGenie.

use thiserror::Error;

/// The primary error type used across provider traits and core operations.
#[derive(Debug, Error)]
pub enum GenieError {
    /// Configuration errors (missing provider URL or key, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level provider failures (network, unexpected status, bad body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The identity provider rejected an auth call. `message` is the
    /// provider's own text and is shown to the user as-is.
    #[error("{message}")]
    Auth { message: String },

    /// Table read/write failures reported by the data provider.
    #[error("data error: {message}")]
    Data {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request carried a value the operation cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The owning view was torn down before the operation finished.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenieError {
    /// Text suitable for rendering inline on a page.
    ///
    /// Auth errors carry the provider's message verbatim; everything else
    /// falls back to the `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            GenieError::Auth { message } => message.clone(),
            GenieError::Provider { message, .. } | GenieError::Data { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
