// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat responder trait.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::GenieError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChatMessage;

/// Produces one assistant reply for one user prompt.
///
/// Implementations must return [`GenieError::Cancelled`] promptly once
/// `cancel` fires and must not produce a reply after that point.
#[async_trait]
pub trait ChatResponder: PluginAdapter {
    async fn respond(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatMessage, GenieError>;
}
