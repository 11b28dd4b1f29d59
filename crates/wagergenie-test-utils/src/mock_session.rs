// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session provider.
//!
//! `MockSessionProvider` keeps accounts and issued tokens in a map so tests
//! can exercise sign-in, sign-up, refresh, and sign-out without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;

use wagergenie_core::GenieError;
use wagergenie_core::traits::{PluginAdapter, SessionProvider};
use wagergenie_core::types::{
    AdapterType, HealthStatus, OtpKind, Session, SessionEvent, SessionTokens, SessionUser,
    SignUpMetadata, SignUpOutcome,
};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: SessionUser,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by email.
    accounts: HashMap<String, Account>,
    /// Access token -> user id.
    access: HashMap<String, String>,
    /// Refresh token -> user id.
    refresh: HashMap<String, String>,
    /// Magic-link token hash -> email.
    otp: HashMap<String, String>,
    fail_lookups: bool,
    auto_confirm: bool,
    expires_at: Option<DateTime<Utc>>,
    sent_links: Vec<(String, String)>,
}

/// A session provider backed by in-memory maps.
pub struct MockSessionProvider {
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for MockSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionProvider {
    /// Create a provider with no accounts. Sign-ups return sessions directly.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(State {
                auto_confirm: true,
                ..State::default()
            })),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a confirmed account.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        let user = SessionUser {
            id: format!("user-{}", uuid::Uuid::new_v4()),
            email: email.to_string(),
            metadata: serde_json::json!({}),
        };
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user,
                confirmed: true,
            },
        );
        self
    }

    /// Require email confirmation: sign-up returns a user but no session.
    pub fn requiring_confirmation(self) -> Self {
        self.lock().auto_confirm = false;
        self
    }

    /// Make every `get_session` call fail with a provider error.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.lock().fail_lookups = fail;
    }

    /// Expiry stamped on sessions issued from now on.
    pub fn set_expires_at(&self, at: Option<DateTime<Utc>>) {
        self.lock().expires_at = at;
    }

    /// Issue a session directly, bypassing passwords.
    pub fn issue_session(&self, email: &str) -> Option<Session> {
        let mut state = self.lock();
        let user = state.accounts.get(email)?.user.clone();
        Some(Self::mint(&mut state, user))
    }

    /// Revoke an access token without emitting an event.
    pub fn revoke_access_token(&self, token: &str) {
        self.lock().access.remove(token);
    }

    /// Register a magic-link token hash for an existing account.
    pub fn add_otp(&self, token_hash: &str, email: &str) {
        self.lock()
            .otp
            .insert(token_hash.to_string(), email.to_string());
    }

    /// Magic links sent so far as `(email, redirect_to)`.
    pub fn sent_links(&self) -> Vec<(String, String)> {
        self.lock().sent_links.clone()
    }

    /// Broadcast an arbitrary event.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn mint(state: &mut State, user: SessionUser) -> Session {
        let access = format!("at-{}", uuid::Uuid::new_v4());
        let refresh = format!("rt-{}", uuid::Uuid::new_v4());
        state.access.insert(access.clone(), user.id.clone());
        state.refresh.insert(refresh.clone(), user.id.clone());
        Session {
            access_token: SecretString::from(access),
            refresh_token: Some(SecretString::from(refresh)),
            expires_at: state.expires_at,
            user,
        }
    }

    fn user_by_id(state: &State, id: &str) -> Option<SessionUser> {
        state
            .accounts
            .values()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
    }
}

#[async_trait]
impl PluginAdapter for MockSessionProvider {
    fn name(&self) -> &str {
        "mock-session"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Session
    }

    async fn health_check(&self) -> Result<HealthStatus, GenieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GenieError> {
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn get_session(&self, tokens: &SessionTokens) -> Result<Option<Session>, GenieError> {
        let (session, refreshed) = {
            let mut state = self.lock();
            if state.fail_lookups {
                return Err(GenieError::Provider {
                    message: "lookup failed".into(),
                    source: None,
                });
            }

            let access = tokens.access_token.expose_secret();
            if let Some(user) = state
                .access
                .get(access)
                .and_then(|id| Self::user_by_id(&state, id))
            {
                let session = Session {
                    access_token: tokens.access_token.clone(),
                    refresh_token: tokens.refresh_token.clone(),
                    expires_at: state.expires_at,
                    user,
                };
                (Some(session), false)
            } else {
                let user = tokens
                    .refresh_token
                    .as_ref()
                    .and_then(|rt| state.refresh.remove(rt.expose_secret()))
                    .and_then(|id| Self::user_by_id(&state, &id));
                match user {
                    Some(user) => (Some(Self::mint(&mut state, user)), true),
                    None => (None, false),
                }
            }
        };

        if refreshed && let Some(session) = &session {
            self.emit(SessionEvent::TokenRefreshed {
                user_id: session.user.id.clone(),
            });
        }
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, GenieError> {
        let session = {
            let mut state = self.lock();
            let account = state
                .accounts
                .get(email)
                .filter(|a| a.password == password.expose_secret())
                .cloned()
                .ok_or_else(|| GenieError::Auth {
                    message: "Invalid login credentials".into(),
                })?;
            if !account.confirmed {
                return Err(GenieError::Auth {
                    message: "Email not confirmed".into(),
                });
            }
            Self::mint(&mut state, account.user)
        };
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
        let outcome = {
            let mut state = self.lock();
            if state.accounts.contains_key(email) {
                return Err(GenieError::Auth {
                    message: "User already registered".into(),
                });
            }
            let user = SessionUser {
                id: format!("user-{}", uuid::Uuid::new_v4()),
                email: email.to_string(),
                metadata: serde_json::json!({
                    "username": metadata.username,
                    "plan": metadata.plan,
                }),
            };
            let confirmed = state.auto_confirm;
            state.accounts.insert(
                email.to_string(),
                Account {
                    password: password.expose_secret().to_string(),
                    user: user.clone(),
                    confirmed,
                },
            );
            let session = confirmed.then(|| Self::mint(&mut state, user.clone()));
            SignUpOutcome {
                user: Some(user),
                session,
            }
        };
        if let Some(session) = &outcome.session {
            self.emit(SessionEvent::SignedIn {
                user_id: session.user.id.clone(),
            });
        }
        Ok(outcome)
    }

    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), GenieError> {
        self.lock()
            .sent_links
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn verify_otp(&self, token_hash: &str, _kind: OtpKind) -> Result<Session, GenieError> {
        let session = {
            let mut state = self.lock();
            let user = state
                .otp
                .remove(token_hash)
                .and_then(|email| state.accounts.get(&email).map(|a| a.user.clone()))
                .ok_or_else(|| GenieError::Auth {
                    message: "Email link is invalid or has expired".into(),
                })?;
            Self::mint(&mut state, user)
        };
        self.emit(SessionEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GenieError> {
        {
            let mut state = self.lock();
            let user_id = &session.user.id;
            state.access.retain(|_, id| id != user_id);
            state.refresh.retain(|_, id| id != user_id);
        }
        self.emit(SessionEvent::SignedOut {
            user_id: session.user.id.clone(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
