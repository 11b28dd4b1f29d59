// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session gate shared by every page that needs a signed-in user.
//!
//! [`SessionGate::require_session`] answers "who is this?" for one request;
//! [`SessionGate::on_invalidate`] answers "when does that stop being true?"
//! for the lifetime of a page view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use wagergenie_core::GenieError;
use wagergenie_core::traits::SessionProvider;
use wagergenie_core::types::{Session, SessionEvent, SessionTokens};

/// Why a session stopped being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    SignedOut,
    Expired,
}

impl Invalidation {
    pub fn as_str(self) -> &'static str {
        match self {
            Invalidation::SignedOut => "signed_out",
            Invalidation::Expired => "expired",
        }
    }
}

/// Why [`SessionGate::require_session`] refused.
#[derive(Debug)]
pub enum GateRejection {
    /// No cookies, or the provider no longer recognizes them.
    NoSession,
    /// The provider could not be asked.
    LookupFailed(GenieError),
}

/// Resolves browser tokens to sessions and watches them for invalidation.
#[derive(Clone)]
pub struct SessionGate {
    provider: Arc<dyn SessionProvider>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    /// One provider lookup. No tokens means no session and no call.
    pub async fn lookup(
        &self,
        tokens: Option<&SessionTokens>,
    ) -> Result<Option<Session>, GenieError> {
        let Some(tokens) = tokens else {
            return Ok(None);
        };
        let session = self.provider.get_session(tokens).await?;
        Ok(session.filter(|s| !s.is_expired(Utc::now())))
    }

    /// Resolve the session or refuse.
    pub async fn require_session(
        &self,
        tokens: Option<&SessionTokens>,
    ) -> Result<Session, GateRejection> {
        match self.lookup(tokens).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(GateRejection::NoSession),
            Err(e) => Err(GateRejection::LookupFailed(e)),
        }
    }

    /// A stream that yields once when `session` ends, then finishes.
    ///
    /// The provider subscription is taken immediately, so a sign-out that
    /// happens before the stream is first polled is not missed. Dropping the
    /// stream drops the subscription.
    pub fn on_invalidate(&self, session: &Session) -> BoxStream<'static, Invalidation> {
        let events = self.provider.subscribe();
        let user_id = session.user.id.clone();
        let expires_at = session.expires_at;
        stream::once(wait_for_invalidation(events, user_id, expires_at)).boxed()
    }
}

async fn wait_for_invalidation(
    mut events: broadcast::Receiver<SessionEvent>,
    user_id: String,
    expires_at: Option<DateTime<Utc>>,
) -> Invalidation {
    let expiry = async move {
        match expires_at {
            Some(at) => {
                let remaining = (at - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(remaining).await;
            }
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(expiry);

    loop {
        tokio::select! {
            _ = &mut expiry => return Invalidation::Expired,
            event = events.recv() => match event {
                Ok(event) if event.invalidates() && event.user_id() == user_id => {
                    debug!(user_id = %user_id, "session invalidated by sign-out");
                    return Invalidation::SignedOut;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session event subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    (&mut expiry).await;
                    return Invalidation::Expired;
                }
            },
        }
    }
}
