// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted auth and table provider for WagerGenie.
//!
//! This crate implements [`SessionProvider`] and [`DataProvider`] against a
//! Supabase-compatible project (GoTrue auth under `/auth/v1`, PostgREST
//! tables under `/rest/v1`). One [`SupabaseProvider`] is built per process
//! and shared by every request.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wagergenie_config::GenieConfig;
use wagergenie_core::error::GenieError;
use wagergenie_core::traits::{DataProvider, PluginAdapter, SessionProvider};
use wagergenie_core::types::{
    AdapterType, HealthStatus, OtpKind, SelectQuery, Session, SessionEvent, SessionTokens,
    SignUpMetadata, SignUpOutcome,
};

use crate::client::SupabaseClient;
use crate::types::{SignUpResponse, access_token_expiry};

/// Capacity of the session event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

/// Session and data provider backed by the hosted project.
pub struct SupabaseProvider {
    client: SupabaseClient,
    events: broadcast::Sender<SessionEvent>,
}

impl SupabaseProvider {
    /// Creates the provider from the `[provider]` config section.
    ///
    /// Fails with [`GenieError::Config`] if the URL or key is missing.
    pub fn new(config: &GenieConfig) -> Result<Self, GenieError> {
        let url = config
            .provider
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GenieError::Config("provider.url is not set".into()))?;
        let key = config
            .provider
            .anon_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenieError::Config("provider.anon_key is not set".into()))?;

        let client = SupabaseClient::new(
            url,
            SecretString::from(key.to_string()),
            Duration::from_secs(config.provider.timeout_secs),
        )?;
        info!(url, "auth provider initialized");
        Ok(Self::with_client(client))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: SupabaseClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { client, events }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(?event, "session event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl PluginAdapter for SupabaseProvider {
    fn name(&self) -> &str {
        "supabase"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SessionAndData
    }

    async fn health_check(&self) -> Result<HealthStatus, GenieError> {
        match self.client.health().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => {
                warn!(error = %e, "auth provider health check failed");
                Ok(HealthStatus::Unhealthy(e.user_message()))
            }
        }
    }

    async fn shutdown(&self) -> Result<(), GenieError> {
        debug!("auth provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for SupabaseProvider {
    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, GenieError> {
        if let Some(user) = self.client.get_user(&tokens.access_token).await? {
            return Ok(Some(Session {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                expires_at: access_token_expiry(tokens.access_token.expose_secret()),
                user: user.into(),
            }));
        }

        let Some(refresh_token) = &tokens.refresh_token else {
            return Ok(None);
        };
        match self.client.refresh_grant(refresh_token).await? {
            Some(token) => {
                let session = token.into_session(Utc::now());
                self.emit(SessionEvent::TokenRefreshed {
                    user_id: session.user.id.clone(),
                });
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, GenieError> {
        let session = self
            .client
            .password_grant(email, password)
            .await?
            .into_session(Utc::now());
        info!(user_id = %session.user.id, "signed in with password");
        self.emit(SessionEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpOutcome, GenieError> {
        let outcome = match self.client.sign_up(email, password, metadata).await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now());
                self.emit(SessionEvent::SignedIn {
                    user_id: session.user.id.clone(),
                });
                SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                user: Some(user.into()),
                session: None,
            },
        };
        info!(
            has_session = outcome.session.is_some(),
            "account created"
        );
        Ok(outcome)
    }

    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), GenieError> {
        self.client.send_otp(email, redirect_to).await?;
        info!(redirect_to, "magic link sent");
        Ok(())
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpKind) -> Result<Session, GenieError> {
        let session = self
            .client
            .verify(token_hash, kind)
            .await?
            .into_session(Utc::now());
        info!(user_id = %session.user.id, %kind, "one-time token verified");
        self.emit(SessionEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GenieError> {
        self.client.logout(&session.access_token).await?;
        info!(user_id = %session.user.id, "signed out");
        self.emit(SessionEvent::SignedOut {
            user_id: session.user.id.clone(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl DataProvider for SupabaseProvider {
    async fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<serde_json::Value>, GenieError> {
        self.client.select(query, access_token).await
    }

    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
        access_token: Option<&SecretString>,
    ) -> Result<(), GenieError> {
        self.client.insert(table, &row, access_token).await
    }
}
