// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML page handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;
use wagergenie_chat::ChatSurface;
use wagergenie_core::feed::{MessageFeed, PickFeed};
use wagergenie_core::types::{SelectQuery, Session};

use crate::guard::LANDING_PATH;
use crate::server::GatewayState;
use crate::session::PageSession;
use crate::views::{
    AuthMode, ChatPage, DashboardPage, GeniePage, GenieTab, LandingPage, PACKAGES, SettingsPage,
    pick_cards,
};

/// Render `template` or answer 500.
pub(crate) fn render_page<S: Serialize>(
    state: &GatewayState,
    status: StatusCode,
    template: &str,
    context: &S,
) -> Response {
    match state.pages.render(template, context) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!(template, error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Query parameters of the landing page.
#[derive(Debug, Default, Deserialize)]
pub struct LandingQuery {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

/// GET /
pub async fn landing(
    State(state): State<GatewayState>,
    Query(query): Query<LandingQuery>,
) -> Response {
    let mode = query
        .mode
        .as_deref()
        .and_then(|m| m.parse::<AuthMode>().ok())
        .unwrap_or_default();
    render_page(
        &state,
        StatusCode::OK,
        "landing.html",
        &LandingPage {
            app_name: &state.settings.app_name,
            mode,
            email: "",
            error: query.error.as_deref().filter(|e| !e.is_empty()),
            notice: query.notice.as_deref().filter(|n| !n.is_empty()),
        },
    )
}

/// GET /app
pub async fn app_root() -> Redirect {
    Redirect::temporary(LANDING_PATH)
}

/// The signed-in user's picks, newest first.
pub(crate) async fn user_picks(state: &GatewayState, session: &Session) -> PickFeed {
    let query = SelectQuery::table("picks")
        .eq("user_id", session.user.id.clone())
        .order("created_at", false)
        .limit(state.settings.picks_limit);
    let fetched = state
        .data
        .select(&query, Some(&session.access_token))
        .await;
    PickFeed::resolve(fetched, Utc::now())
}

/// GET /app/dashboard
pub async fn dashboard(
    State(state): State<GatewayState>,
    PageSession(session): PageSession,
) -> Response {
    let feed = user_picks(&state, &session).await;
    render_page(
        &state,
        StatusCode::OK,
        "dashboard.html",
        &DashboardPage {
            app_name: &state.settings.app_name,
            active: "dashboard",
            stats: feed.stats(),
            picks: pick_cards(&feed.picks),
            source: feed.source,
        },
    )
}

/// GET /app/chat
///
/// Every render is a fresh view with an empty transcript.
pub async fn chat(
    State(state): State<GatewayState>,
    PageSession(session): PageSession,
) -> Response {
    let view = state.views.open(ChatSurface::App, &session.user.id);
    render_page(
        &state,
        StatusCode::OK,
        "chat.html",
        &ChatPage {
            app_name: &state.settings.app_name,
            active: "chat",
            view_id: &view.id,
            messages: view.transcript.messages(),
            error_reply: &state.settings.error_reply,
        },
    )
}

/// GET /app/settings
pub async fn settings(
    State(state): State<GatewayState>,
    PageSession(session): PageSession,
) -> Response {
    let preferences = state
        .preferences
        .get(&session.user.id)
        .map(|p| p.clone())
        .unwrap_or_default();
    render_page(
        &state,
        StatusCode::OK,
        "settings.html",
        &SettingsPage::new(&state.settings.app_name, &session.user.email, &preferences),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct GenieQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

/// GET /genie
///
/// Not behind the route guard: the page resolves the session itself.
pub async fn genie(
    State(state): State<GatewayState>,
    PageSession(session): PageSession,
    Query(query): Query<GenieQuery>,
) -> Response {
    let tab = query
        .tab
        .as_deref()
        .and_then(|t| t.parse::<GenieTab>().ok())
        .unwrap_or_default();

    let token = Some(&session.access_token);
    let picks_query = SelectQuery::table("picks").order("date", false);
    let messages_query = SelectQuery::table("messages").order("timestamp", true);
    let (picks, messages) = tokio::join!(
        state.data.select(&picks_query, token),
        state.data.select(&messages_query, token),
    );
    let now = Utc::now();
    let picks = PickFeed::resolve(picks, now);
    let messages = MessageFeed::resolve(messages, now);

    let view = state
        .views
        .open_with_history(ChatSurface::Genie, &session.user.id, messages.messages);
    render_page(
        &state,
        StatusCode::OK,
        "genie.html",
        &GeniePage {
            app_name: &state.settings.app_name,
            view_id: &view.id,
            tab,
            picks: pick_cards(&picks.picks),
            messages: view.transcript.messages(),
            error_reply: &state.settings.error_reply,
            packages: &PACKAGES,
        },
    )
}
