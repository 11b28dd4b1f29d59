// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sign-in, sign-up, magic link, sign-out, and the email-link callback.
//!
//! Form posts answer with a 303 redirect on success, or re-render the
//! landing page with the provider's message on failure.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::HOST},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};
use wagergenie_core::GenieError;
use wagergenie_core::types::{OtpKind, SignUpMetadata};

use crate::guard::{CALLBACK_PATH, ENTRY_PATH, LANDING_PATH, with_error};
use crate::pages::render_page;
use crate::server::GatewayState;
use crate::session::{clear_session, store_session, tokens_from_jar};
use crate::views::{AuthMode, LandingPage};

/// Where a fresh sign-in lands.
pub const POST_SIGN_IN_PATH: &str = "/genie";
pub const MIN_PASSWORD_LEN: usize = 6;
pub const CONFIRM_EMAIL_NOTICE: &str = "Check your email to confirm your account.";
pub const MAGIC_LINK_NOTICE: &str = "Check your email for the login link!";
pub const FALLBACK_AUTH_ERROR: &str =
    "Authentication failed. Please check your credentials and try again.";
pub const INVALID_LINK_ERROR: &str = "Email link is invalid or has expired";

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailForm {
    pub email: String,
}

/// Query string of the link in the provider's email.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub token_hash: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Set by the provider when it already rejected the link.
    #[serde(default)]
    pub error_description: Option<String>,
}

fn landing_with(
    state: &GatewayState,
    status: StatusCode,
    mode: AuthMode,
    email: &str,
    error: Option<&str>,
    notice: Option<&str>,
) -> Response {
    render_page(
        state,
        status,
        "landing.html",
        &LandingPage {
            app_name: &state.settings.app_name,
            mode,
            email,
            error,
            notice,
        },
    )
}

fn auth_failure(state: &GatewayState, mode: AuthMode, email: &str, err: &GenieError) -> Response {
    let status = match err {
        GenieError::Auth { .. } | GenieError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    let message = err.user_message();
    let message = if message.is_empty() {
        FALLBACK_AUTH_ERROR.to_string()
    } else {
        message
    };
    landing_with(state, status, mode, email, Some(&message), None)
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<GatewayState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = form.email.trim();
    let password = SecretString::from(form.password);
    match state.sessions.sign_in_with_password(email, &password).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "signed in");
            let jar = store_session(jar, &session, state.settings.secure_cookies);
            (jar, Redirect::to(POST_SIGN_IN_PATH)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "sign-in rejected");
            auth_failure(&state, AuthMode::Signin, email, &e)
        }
    }
}

/// POST /auth/sign-up
///
/// A provider that auto-confirms returns a session; otherwise the new account
/// is signed in with the same credentials. A provider error is shown as-is,
/// including "already registered": that case is not turned into a sign-in.
pub async fn sign_up(
    State(state): State<GatewayState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = form.email.trim();
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        let message = format!("Password should be at least {MIN_PASSWORD_LEN} characters.");
        return landing_with(
            &state,
            StatusCode::BAD_REQUEST,
            AuthMode::Signup,
            email,
            Some(&message),
            None,
        );
    }
    let password = SecretString::from(form.password);
    let metadata = SignUpMetadata::from_email(email);

    let outcome = match state.sessions.sign_up(email, &password, &metadata).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "sign-up rejected");
            return auth_failure(&state, AuthMode::Signup, email, &e);
        }
    };

    let session = match (outcome.session, outcome.user) {
        (Some(session), _) => Some(session),
        (None, Some(user)) => match state.sessions.sign_in_with_password(email, &password).await {
            Ok(session) => Some(session),
            Err(e) => {
                info!(
                    user_id = %user.id,
                    error = %e,
                    "account created, sign-in pending confirmation"
                );
                None
            }
        },
        (None, None) => None,
    };

    match session {
        Some(session) => {
            info!(user_id = %session.user.id, "signed up");
            let jar = store_session(jar, &session, state.settings.secure_cookies);
            (jar, Redirect::to(POST_SIGN_IN_PATH)).into_response()
        }
        None => landing_with(
            &state,
            StatusCode::OK,
            AuthMode::Signin,
            email,
            None,
            Some(CONFIRM_EMAIL_NOTICE),
        ),
    }
}

/// The absolute URL the emailed link should return to.
fn callback_url(state: &GatewayState, headers: &HeaderMap) -> String {
    let base = match &state.settings.public_url {
        Some(url) => url.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost");
            let scheme = if state.settings.secure_cookies { "https" } else { "http" };
            format!("{scheme}://{host}")
        }
    };
    format!("{base}{CALLBACK_PATH}")
}

/// POST /auth/magic-link
pub async fn magic_link(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Form(form): Form<EmailForm>,
) -> Response {
    let email = form.email.trim();
    let redirect_to = callback_url(&state, &headers);
    match state.sessions.sign_in_with_otp(email, &redirect_to).await {
        Ok(()) => {
            info!(redirect_to = %redirect_to, "magic link sent");
            landing_with(
                &state,
                StatusCode::OK,
                AuthMode::Signin,
                email,
                None,
                Some(MAGIC_LINK_NOTICE),
            )
        }
        Err(e) => {
            warn!(error = %e, "magic link rejected");
            auth_failure(&state, AuthMode::Signin, email, &e)
        }
    }
}

/// POST /auth/sign-out
///
/// Always clears the cookies, even when the provider call fails.
pub async fn sign_out(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    let tokens = tokens_from_jar(&jar);
    match state.gate.lookup(tokens.as_ref()).await {
        Ok(Some(session)) => {
            if let Err(e) = state.sessions.sign_out(&session).await {
                warn!(user_id = %session.user.id, error = %e, "provider sign-out failed");
            } else {
                info!(user_id = %session.user.id, "signed out");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "session lookup failed during sign-out"),
    }
    (clear_session(jar), Redirect::to(ENTRY_PATH)).into_response()
}

/// GET /auth/callback
///
/// Only reached without a session; signed-in visitors are redirected by the
/// route guard first.
pub async fn callback(
    State(state): State<GatewayState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(description) = query.error_description.filter(|d| !d.is_empty()) {
        return Redirect::temporary(&with_error(ENTRY_PATH, &description)).into_response();
    }

    let kind = query.kind.as_deref().and_then(|k| k.parse::<OtpKind>().ok());
    let (Some(token_hash), Some(kind)) = (query.token_hash.filter(|t| !t.is_empty()), kind) else {
        return Redirect::temporary(&with_error(ENTRY_PATH, INVALID_LINK_ERROR)).into_response();
    };

    match state.sessions.verify_otp(&token_hash, kind).await {
        Ok(session) => {
            info!(user_id = %session.user.id, %kind, "email link verified");
            let jar = store_session(jar, &session, state.settings.secure_cookies);
            (jar, Redirect::temporary(LANDING_PATH)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "email link rejected");
            Redirect::temporary(&with_error(ENTRY_PATH, &e.user_message())).into_response()
        }
    }
}
