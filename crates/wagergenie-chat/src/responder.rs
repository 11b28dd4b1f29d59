// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder assistant that answers every prompt with a fixed reply.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wagergenie_config::model::ChatConfig;
use wagergenie_core::error::GenieError;
use wagergenie_core::traits::{ChatResponder, PluginAdapter};
use wagergenie_core::types::{AdapterType, ChatMessage, HealthStatus};

use crate::ChatSurface;

/// Replies with a fixed string after a fixed delay.
///
/// The delay is raced against the caller's cancel token; a cancelled
/// request returns [`GenieError::Cancelled`] and produces no message.
#[derive(Debug, Clone)]
pub struct CannedResponder {
    reply: String,
    delay: Duration,
}

impl CannedResponder {
    pub fn new(reply: impl Into<String>, delay: Duration) -> Self {
        Self {
            reply: reply.into(),
            delay,
        }
    }

    /// Builds the responder for a chat surface from the `[chat]` config section.
    pub fn for_surface(config: &ChatConfig, surface: ChatSurface) -> Self {
        let reply = match surface {
            ChatSurface::App => &config.app_reply,
            ChatSurface::Genie => &config.genie_reply,
        };
        Self::new(reply.clone(), Duration::from_millis(config.reply_delay_ms))
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }
}

#[async_trait]
impl PluginAdapter for CannedResponder {
    fn name(&self) -> &str {
        "canned"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, GenieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GenieError> {
        Ok(())
    }
}

#[async_trait]
impl ChatResponder for CannedResponder {
    async fn respond(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatMessage, GenieError> {
        debug!(
            prompt_len = prompt.len(),
            delay_ms = self.delay.as_millis() as u64,
            "canned reply scheduled"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenieError::Cancelled),
            _ = tokio::time::sleep(self.delay) => Ok(ChatMessage::assistant(self.reply.clone())),
        }
    }
}
