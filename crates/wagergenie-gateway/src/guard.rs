// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route guard.
//!
//! Keeps signed-out visitors out of `/app` and bounces signed-in visitors
//! from the entry and callback pages to the dashboard. The decision itself is
//! the pure function [`decide`]; [`route_guard`] is the axum middleware that
//! resolves the session and applies it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::server::GatewayState;
use crate::session::{CookieUpdates, ResolvedSession, tokens_from_jar};

/// Public entry page.
pub const ENTRY_PATH: &str = "/";
/// Landing page for the email-link flow.
pub const CALLBACK_PATH: &str = "/auth/callback";
/// Default page after sign-in.
pub const LANDING_PATH: &str = "/app/dashboard";
/// Everything at or under this prefix requires a session.
pub const PROTECTED_PREFIX: &str = "/app";
/// Error shown when the session lookup itself fails.
pub const LOOKUP_FAILED_ERROR: &str = "An error occurred during authentication";

/// Result of resolving the request's cookies against the session provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLookup {
    Absent,
    Valid,
    Failed,
}

/// What the guard does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect {
        target: &'static str,
        error: Option<String>,
    },
}

impl GuardDecision {
    /// The `Location` for a redirect, with `error` as a query parameter.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Pass => None,
            GuardDecision::Redirect {
                target,
                error: None,
            } => Some((*target).to_string()),
            GuardDecision::Redirect {
                target,
                error: Some(error),
            } => Some(with_error(target, error)),
        }
    }
}

/// `target?error=<error>`, form-encoded.
pub fn with_error(target: &str, error: &str) -> String {
    let query = serde_urlencoded::to_string([("error", error)]).unwrap_or_default();
    format!("{target}?{query}")
}

/// `/app` and everything below it.
pub fn is_protected(path: &str) -> bool {
    path == PROTECTED_PREFIX
        || path
            .strip_prefix(PROTECTED_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Paths the guard looks at. Everything else passes without a lookup.
pub fn is_guarded(path: &str) -> bool {
    path == ENTRY_PATH || path == CALLBACK_PATH || is_protected(path)
}

/// Decide what to do with a request to a guarded path.
///
/// `error_param` is the inbound `error` query parameter, if any.
pub fn decide(path: &str, error_param: Option<&str>, lookup: SessionLookup) -> GuardDecision {
    match lookup {
        // An entry page already showing an error must not redirect to itself.
        SessionLookup::Failed if path == ENTRY_PATH && error_param.is_some() => GuardDecision::Pass,
        SessionLookup::Failed => GuardDecision::Redirect {
            target: ENTRY_PATH,
            error: Some(LOOKUP_FAILED_ERROR.to_string()),
        },
        SessionLookup::Absent if is_protected(path) => GuardDecision::Redirect {
            target: ENTRY_PATH,
            error: error_param.map(str::to_string),
        },
        SessionLookup::Valid if path == ENTRY_PATH || path == CALLBACK_PATH => {
            GuardDecision::Redirect {
                target: LANDING_PATH,
                error: None,
            }
        }
        _ => GuardDecision::Pass,
    }
}

/// The `error` parameter of a query string, if present (possibly empty).
pub fn error_param(query: Option<&str>) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key == "error")
        .map(|(_, value)| value)
}

/// Middleware applying [`decide`] to guarded paths.
///
/// A valid session is stored in the request extensions as
/// [`ResolvedSession`] so handlers do not look it up twice.
pub async fn route_guard(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let error = error_param(request.uri().query());
    let jar = CookieJar::from_headers(request.headers());
    let tokens = tokens_from_jar(&jar);
    let updates = request.extensions().get::<CookieUpdates>().cloned();

    let lookup = match state.gate.lookup(tokens.as_ref()).await {
        Ok(Some(session)) => {
            if let (Some(updates), Some(tokens)) = (&updates, &tokens) {
                updates.track_refresh(tokens, &session);
            }
            request.extensions_mut().insert(ResolvedSession(session));
            SessionLookup::Valid
        }
        Ok(None) => {
            if let (Some(updates), Some(_)) = (&updates, &tokens) {
                updates.clear();
            }
            SessionLookup::Absent
        }
        Err(e) => {
            warn!(path = %path, error = %e, "session lookup failed");
            SessionLookup::Failed
        }
    };

    match decide(&path, error.as_deref(), lookup) {
        GuardDecision::Pass => next.run(request).await,
        decision => {
            let location = decision.location().unwrap_or_else(|| ENTRY_PATH.to_string());
            debug!(path = %path, ?lookup, location = %location, "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
