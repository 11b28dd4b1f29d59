// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the hosted auth and table endpoints.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use wagergenie_core::types::{Session, SessionUser, SignUpMetadata};

/// A user object as returned by `/auth/v1/user` and embedded in token responses.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl From<UserResponse> for SessionUser {
    fn from(user: UserResponse) -> Self {
        SessionUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            metadata: user.user_metadata,
        }
    }
}

#[derive(Deserialize)]
struct AccessClaims {
    exp: i64,
}

/// The `exp` claim of a JWT access token.
///
/// The signature is not checked: the token has already been accepted by
/// the auth endpoint, this only reads when it stops being accepted.
pub fn access_token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: AccessClaims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

/// Response of the token, verify, and auto-confirmed signup endpoints.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserResponse,
}

impl TokenResponse {
    /// Convert into a domain session, resolving expiry against `now`.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user.id)
            .finish()
    }
}

/// Signup returns a full session when email confirmation is off and a bare
/// user object when it is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// Body of the password grant and signup endpoints.
#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a SignUpMetadata>,
}

#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Body of `/auth/v1/otp`.
#[derive(Serialize)]
pub struct OtpRequest<'a> {
    pub email: &'a str,
    pub create_user: bool,
}

/// Body of `/auth/v1/verify`.
#[derive(Serialize)]
pub struct VerifyRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub token_hash: &'a str,
}

/// Error body shapes used across the auth and table endpoints.
///
/// Different endpoints put the human-readable text in different fields.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The first non-empty message field, in provider precedence order.
    pub fn into_message(self) -> Option<String> {
        [self.msg, self.error_description, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}
