// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted auth (`/auth/v1`) and table (`/rest/v1`) APIs.
//!
//! Provides [`SupabaseClient`], which owns the single connection pool, sends
//! the public key on every request, and turns error bodies into
//! [`GenieError`]s carrying the provider's own message. Requests are never
//! retried.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use wagergenie_core::GenieError;
use wagergenie_core::types::{OtpKind, SelectQuery, SignUpMetadata};

use crate::types::{
    ApiErrorBody, CredentialsRequest, OtpRequest, RefreshRequest, SignUpResponse, TokenResponse,
    UserResponse, VerifyRequest,
};

/// Which error variant a failed response maps to.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Auth,
    Data,
}

/// HTTP client for the hosted project.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Project URL, e.g. `https://abc.supabase.co`
    /// * `anon_key` - Public (anon) key sent as the `apikey` header
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, GenieError> {
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(anon_key.expose_secret())
            .map_err(|e| GenieError::Config(format!("invalid anon key header value: {e}")))?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GenieError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Returns the project base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bearer(token: &SecretString) -> String {
        format!("Bearer {}", token.expose_secret())
    }

    /// Looks up the user behind an access token.
    ///
    /// Returns `Ok(None)` when the token is rejected (401/403).
    pub async fn get_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<UserResponse>, GenieError> {
        let response = self
            .client
            .get(self.url("/auth/v1/user"))
            .header(AUTHORIZATION, Self::bearer(access_token))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, "user lookup response received");
        if is_rejected(status) {
            return Ok(None);
        }
        read_json(response, Surface::Auth).await.map(Some)
    }

    /// Email + password grant.
    pub async fn password_grant(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, GenieError> {
        let body = CredentialsRequest {
            email,
            password: password.expose_secret(),
            data: None,
        };
        let response = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(status = %response.status(), "password grant response received");
        read_json(response, Surface::Auth).await
    }

    /// Refresh-token grant.
    ///
    /// Returns `Ok(None)` when the refresh token is rejected (400/401/403).
    pub async fn refresh_grant(
        &self,
        refresh_token: &SecretString,
    ) -> Result<Option<TokenResponse>, GenieError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        let response = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, "refresh grant response received");
        if status == StatusCode::BAD_REQUEST || is_rejected(status) {
            return Ok(None);
        }
        read_json(response, Surface::Auth).await.map(Some)
    }

    /// Creates an account with the given user metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpResponse, GenieError> {
        let body = CredentialsRequest {
            email,
            password: password.expose_secret(),
            data: Some(metadata),
        };
        let response = self
            .client
            .post(self.url("/auth/v1/signup"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(status = %response.status(), "signup response received");
        read_json(response, Surface::Auth).await
    }

    /// Sends a magic link whose landing page is `redirect_to`.
    pub async fn send_otp(&self, email: &str, redirect_to: &str) -> Result<(), GenieError> {
        let body = OtpRequest {
            email,
            create_user: true,
        };
        let response = self
            .client
            .post(self.url("/auth/v1/otp"))
            .query(&[("redirect_to", redirect_to)])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(status = %response.status(), "otp response received");
        expect_success(response, Surface::Auth).await
    }

    /// Exchanges a token hash from an email link for a session.
    pub async fn verify(
        &self,
        token_hash: &str,
        kind: OtpKind,
    ) -> Result<TokenResponse, GenieError> {
        let kind = kind.to_string();
        let body = VerifyRequest {
            kind: &kind,
            token_hash,
        };
        let response = self
            .client
            .post(self.url("/auth/v1/verify"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(status = %response.status(), "verify response received");
        read_json(response, Surface::Auth).await
    }

    /// Revokes the session behind `access_token`.
    ///
    /// A token the provider already rejects counts as signed out.
    pub async fn logout(&self, access_token: &SecretString) -> Result<(), GenieError> {
        let response = self
            .client
            .post(self.url("/auth/v1/logout"))
            .header(AUTHORIZATION, Self::bearer(access_token))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, "logout response received");
        if is_rejected(status) {
            return Ok(());
        }
        expect_success(response, Surface::Auth).await
    }

    /// Probes the auth service health endpoint.
    pub async fn health(&self) -> Result<(), GenieError> {
        let response = self
            .client
            .get(self.url("/auth/v1/health"))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response, Surface::Auth).await
    }

    /// Runs a filtered, ordered, bounded read against one table.
    ///
    /// Without an access token the public key is the bearer, so only rows
    /// readable by anonymous users are returned.
    pub async fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<serde_json::Value>, GenieError> {
        check_table(&query.table)?;

        let mut params: Vec<(String, String)> = vec![("select".into(), "*".into())];
        for (column, value) in &query.filters {
            params.push((column.clone(), format!("eq.{value}")));
        }
        if let Some((column, ascending)) = &query.order {
            let direction = if *ascending { "asc" } else { "desc" };
            params.push(("order".into(), format!("{column}.{direction}")));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".into(), limit.to_string()));
        }

        let bearer = access_token.unwrap_or(&self.anon_key);
        let response = self
            .client
            .get(self.url(&format!("/rest/v1/{}", query.table)))
            .header(AUTHORIZATION, Self::bearer(bearer))
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(table = %query.table, status = %response.status(), "select response received");
        read_json(response, Surface::Data).await
    }

    /// Inserts one row into a table.
    pub async fn insert(
        &self,
        table: &str,
        row: &serde_json::Value,
        access_token: Option<&SecretString>,
    ) -> Result<(), GenieError> {
        check_table(table)?;

        let bearer = access_token.unwrap_or(&self.anon_key);
        let response = self
            .client
            .post(self.url(&format!("/rest/v1/{table}")))
            .header(AUTHORIZATION, Self::bearer(bearer))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(transport_error)?;
        debug!(table, status = %response.status(), "insert response received");
        expect_success(response, Surface::Data).await
    }
}

/// Table names are path segments; keep them to identifier characters.
fn check_table(table: &str) -> Result<(), GenieError> {
    if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GenieError::InvalidInput(format!(
            "invalid table name `{table}`"
        )));
    }
    Ok(())
}

fn is_rejected(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

fn transport_error(e: reqwest::Error) -> GenieError {
    if e.is_timeout() {
        return GenieError::Provider {
            message: "request to the auth provider timed out".into(),
            source: Some(Box::new(e)),
        };
    }
    GenieError::Provider {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    surface: Surface,
) -> Result<T, GenieError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| GenieError::Provider {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    if !status.is_success() {
        return Err(api_error(status, &body, surface));
    }
    serde_json::from_str(&body).map_err(|e| GenieError::Provider {
        message: format!("failed to parse provider response: {e}"),
        source: Some(Box::new(e)),
    })
}

async fn expect_success(response: Response, surface: Surface) -> Result<(), GenieError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body, surface))
}

/// Maps a failed response to an error carrying the provider's message.
///
/// Client errors on auth endpoints are user-facing (`Auth`); server errors
/// are `Provider`. Table endpoint failures are always `Data`.
fn api_error(status: StatusCode, body: &str, surface: Surface) -> GenieError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| status.to_string());

    match surface {
        Surface::Auth if status.is_client_error() => GenieError::Auth { message },
        Surface::Auth => GenieError::Provider {
            message,
            source: None,
        },
        Surface::Data => GenieError::Data {
            message,
            source: None,
        },
    }
}
