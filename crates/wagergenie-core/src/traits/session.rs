// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session provider trait for the external identity service.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::broadcast;

use crate::error::GenieError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OtpKind, Session, SessionEvent, SessionTokens, SignUpMetadata, SignUpOutcome};

/// Issues, validates and revokes user sessions.
///
/// Every auth call reports provider rejections as [`GenieError::Auth`]
/// carrying the provider's own message, and transport failures as
/// [`GenieError::Provider`].
#[async_trait]
pub trait SessionProvider: PluginAdapter {
    /// Resolve browser tokens to a session.
    ///
    /// Returns `Ok(None)` when the tokens are absent, expired, or rejected.
    /// A returned session may carry refreshed tokens that differ from the
    /// ones passed in.
    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, GenieError>;

    /// Email + password sign-in.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, GenieError>;

    /// Create an account.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpOutcome, GenieError>;

    /// Send a magic link that lands on `redirect_to`.
    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), GenieError>;

    /// Exchange a one-time token hash from an email link for a session.
    async fn verify_otp(&self, token_hash: &str, kind: OtpKind) -> Result<Session, GenieError>;

    /// Revoke the session.
    async fn sign_out(&self, session: &Session) -> Result<(), GenieError>;

    /// Subscribe to session change notifications.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
