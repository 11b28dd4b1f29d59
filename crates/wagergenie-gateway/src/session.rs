// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session cookies and the request extractors built on [`SessionGate`].
//!
//! The browser carries the provider's access and refresh tokens in two
//! HTTP-only cookies. Any lookup may hand back rotated tokens, so the
//! [`session_cookies_layer`] middleware gives each request a [`CookieUpdates`]
//! slot and writes whatever was recorded there back to the browser once the
//! response is built.
//!
//! [`SessionGate`]: crate::gate::SessionGate

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use wagergenie_core::types::{Session, SessionTokens};

use crate::gate::GateRejection;
use crate::guard::{ENTRY_PATH, LOOKUP_FAILED_ERROR, with_error};
use crate::handlers::ErrorResponse;
use crate::server::GatewayState;

pub const ACCESS_COOKIE: &str = "wg-access-token";
pub const REFRESH_COOKIE: &str = "wg-refresh-token";

/// Read the session tokens from the request cookies.
///
/// Without an access token there is nothing to resolve.
pub fn tokens_from_jar(jar: &CookieJar) -> Option<SessionTokens> {
    let access = jar.get(ACCESS_COOKIE).map(Cookie::value)?;
    if access.is_empty() {
        return None;
    }
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty());
    Some(SessionTokens {
        access_token: SecretString::from(access.to_string()),
        refresh_token: refresh.map(|v| SecretString::from(v.to_string())),
    })
}

fn build_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .permanent()
        .build()
}

/// Cookies that hand `session` to the browser.
pub fn session_cookies(session: &Session, secure: bool) -> Vec<Cookie<'static>> {
    let mut cookies = vec![build_cookie(
        ACCESS_COOKIE,
        session.access_token.expose_secret().to_string(),
        secure,
    )];
    if let Some(refresh) = &session.refresh_token {
        cookies.push(build_cookie(
            REFRESH_COOKIE,
            refresh.expose_secret().to_string(),
            secure,
        ));
    }
    cookies
}

/// Cookies that remove both tokens from the browser.
pub fn cleared_cookies() -> Vec<Cookie<'static>> {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .map(|name| Cookie::build((name, "")).path("/").removal().build())
        .collect()
}

/// Add `session`'s cookies to `jar`.
pub fn store_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    session_cookies(session, secure)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

/// Remove both session cookies from `jar`.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    cleared_cookies()
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

#[derive(Debug, Clone)]
enum CookieChange {
    Set(Session),
    Clear,
}

/// Per-request record of a cookie change discovered during a lookup.
#[derive(Debug, Clone, Default)]
pub struct CookieUpdates(Arc<Mutex<Option<CookieChange>>>);

impl CookieUpdates {
    /// Record `session` if its tokens differ from the ones the browser sent.
    pub fn track_refresh(&self, sent: &SessionTokens, session: &Session) {
        let same_access = sent.access_token.expose_secret() == session.access_token.expose_secret();
        let same_refresh = match (&sent.refresh_token, &session.refresh_token) {
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            (None, None) => true,
            _ => false,
        };
        if !(same_access && same_refresh) {
            debug!(user_id = %session.user.id, "session tokens rotated");
            self.set(CookieChange::Set(session.clone()));
        }
    }

    /// Record that the browser's tokens are dead.
    pub fn clear(&self) {
        self.set(CookieChange::Clear);
    }

    fn set(&self, change: CookieChange) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(change);
        }
    }

    fn take(&self) -> Option<CookieChange> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Middleware that provides [`CookieUpdates`] and applies it.
///
/// A handler that sets session cookies itself wins; recorded changes are
/// only applied when the response carries no `Set-Cookie` header.
pub async fn session_cookies_layer(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let updates = CookieUpdates::default();
    request.extensions_mut().insert(updates.clone());

    let mut response = next.run(request).await;

    let Some(change) = updates.take() else {
        return response;
    };
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }
    let cookies = match change {
        CookieChange::Set(session) => session_cookies(&session, state.settings.secure_cookies),
        CookieChange::Clear => cleared_cookies(),
    };
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = cookie.name(), error = %e, "unencodable session cookie"),
        }
    }
    response
}

/// The session resolved by the route guard for this request.
#[derive(Debug, Clone)]
pub struct ResolvedSession(pub Session);

async fn resolve(parts: &mut Parts, state: &GatewayState) -> Result<Session, GateRejection> {
    if let Some(ResolvedSession(session)) = parts.extensions.get::<ResolvedSession>() {
        return Ok(session.clone());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    let tokens = tokens_from_jar(&jar);
    let updates = parts.extensions.get::<CookieUpdates>().cloned();

    let result = state.gate.require_session(tokens.as_ref()).await;
    match (&result, &updates, &tokens) {
        (Ok(session), Some(updates), Some(tokens)) => updates.track_refresh(tokens, session),
        (Err(GateRejection::NoSession), Some(updates), Some(_)) => updates.clear(),
        (Err(GateRejection::LookupFailed(e)), _, _) => {
            warn!(path = %parts.uri.path(), error = %e, "session lookup failed");
        }
        _ => {}
    }
    if let Ok(session) = &result {
        parts
            .extensions
            .insert(ResolvedSession(session.clone()));
    }
    result
}

/// Session for an HTML page. Without one the browser is sent to `/`.
#[derive(Debug, Clone)]
pub struct PageSession(pub Session);

impl FromRequestParts<GatewayState> for PageSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(session) => Ok(Self(session)),
            Err(GateRejection::NoSession) => Err(Redirect::temporary(ENTRY_PATH).into_response()),
            Err(GateRejection::LookupFailed(_)) => Err(Redirect::temporary(&with_error(
                ENTRY_PATH,
                LOOKUP_FAILED_ERROR,
            ))
            .into_response()),
        }
    }
}

/// Session for a JSON endpoint. Without one the request is refused.
#[derive(Debug, Clone)]
pub struct ApiSession(pub Session);

impl FromRequestParts<GatewayState> for ApiSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(session) => Ok(Self(session)),
            Err(GateRejection::NoSession) => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("not signed in")),
            )
                .into_response()),
            Err(GateRejection::LookupFailed(_)) => Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(LOOKUP_FAILED_ERROR)),
            )
                .into_response()),
        }
    }
}
