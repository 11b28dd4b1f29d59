// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered, append-only chat transcript for one page view.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wagergenie_core::error::GenieError;
use wagergenie_core::traits::ChatResponder;
use wagergenie_core::types::ChatMessage;

/// Reply appended when the responder fails.
pub const DEFAULT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// What happened to a submitted message.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// The user message and exactly one assistant message were appended.
    Replied(ChatMessage),
    /// The view went away before the reply; only the user message was appended.
    Cancelled,
}

/// Shared handle to a transcript. Clones see the same messages.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    error_reply: Arc<str>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::with_messages(Vec::new())
    }

    /// Starts a transcript from existing history.
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: Arc::new(Mutex::new(messages)),
            error_reply: Arc::from(DEFAULT_ERROR_REPLY),
        }
    }

    pub fn with_error_reply(mut self, reply: impl Into<String>) -> Self {
        self.error_reply = Arc::from(reply.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        // Appends cannot leave the vector half-written.
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the transcript in append order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, message: ChatMessage) {
        self.lock().push(message);
    }

    /// Submit user input and wait for the assistant.
    ///
    /// The user message is appended before the responder runs. If `cancel`
    /// fires first, no assistant message is ever appended.
    pub async fn submit(
        &self,
        text: &str,
        responder: &dyn ChatResponder,
        cancel: &CancellationToken,
    ) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.push(ChatMessage::user(text));

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenieError::Cancelled),
            result = responder.respond(text, cancel) => result,
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(GenieError::Cancelled) => {
                debug!("view closed before reply");
                return SubmitOutcome::Cancelled;
            }
            Err(e) => {
                warn!(error = %e, responder = responder.name(), "responder failed");
                ChatMessage::assistant(self.error_reply.to_string())
            }
        };

        // The token may have fired between the reply and this point.
        if cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }
        self.push(reply.clone());
        SubmitOutcome::Replied(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use wagergenie_core::traits::PluginAdapter;
    use wagergenie_core::types::{AdapterType, ChatRole, HealthStatus};

    use super::*;
    use crate::CannedResponder;

    struct FailingResponder;

    #[async_trait]
    impl PluginAdapter for FailingResponder {
        fn name(&self) -> &str {
            "failing"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
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
    impl ChatResponder for FailingResponder {
        async fn respond(
            &self,
            _prompt: &str,
            _cancel: &CancellationToken,
        ) -> Result<ChatMessage, GenieError> {
            Err(GenieError::Internal("boom".into()))
        }
    }

    fn responder() -> CannedResponder {
        CannedResponder::new("canned", Duration::from_millis(1000))
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_is_ignored() {
        let transcript = ChatTranscript::new();
        let outcome = transcript
            .submit("  \n\t ", &responder(), &CancellationToken::new())
            .await;
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(transcript.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_appends_user_then_assistant() {
        let transcript = ChatTranscript::new();
        let outcome = transcript
            .submit("Who wins tonight?", &responder(), &CancellationToken::new())
            .await;
        assert!(matches!(outcome, SubmitOutcome::Replied(ref m) if m.content == "canned"));

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "Who wins tonight?");
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn user_message_is_visible_while_waiting() {
        let transcript = ChatTranscript::new();
        let cancel = CancellationToken::new();
        let background = transcript.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            background.submit("hi", &responder(), &task_cancel).await
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(transcript.len(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(task.await.unwrap(), SubmitOutcome::Replied(_)));
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_reply() {
        let transcript = ChatTranscript::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = transcript.submit("hi", &responder(), &cancel).await;
        assert_eq!(outcome, SubmitOutcome::Cancelled);

        // Well past the original delay, still only the user message.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn failure_appends_error_reply() {
        let transcript = ChatTranscript::new().with_error_reply("try later");
        let outcome = transcript
            .submit("hi", &FailingResponder, &CancellationToken::new())
            .await;
        assert!(matches!(outcome, SubmitOutcome::Replied(ref m) if m.content == "try later"));
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn two_submits_keep_order() {
        let transcript = ChatTranscript::new();
        let cancel = CancellationToken::new();
        transcript.submit("one", &responder(), &cancel).await;
        transcript.submit("two", &responder(), &cancel).await;
        let contents: Vec<_> = transcript
            .messages()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["one", "canned", "two", "canned"]);
    }
}
