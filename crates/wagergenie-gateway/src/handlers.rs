// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON API handlers.
//!
//! Handles GET /api/picks, GET/POST /api/chat, GET/POST /api/preferences and
//! the public GET /health.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wagergenie_chat::{ChatSurface, SubmitOutcome, View};
use wagergenie_core::feed::{DashboardStats, FeedSource};
use wagergenie_core::traits::PluginAdapter;
use wagergenie_core::types::{
    ChatMessage, HealthStatus, Pick, PreferenceChange, Session, UserPreferences,
};

use crate::pages::user_picks;
use crate::server::GatewayState;
use crate::session::ApiSession;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error))).into_response()
}

/// Response body for GET /api/picks.
#[derive(Debug, Serialize)]
pub struct PicksResponse {
    pub picks: Vec<Pick>,
    pub source: FeedSource,
    pub stats: DashboardStats,
}

/// GET /api/picks
pub async fn get_picks(
    State(state): State<GatewayState>,
    ApiSession(session): ApiSession,
) -> Json<PicksResponse> {
    let feed = user_picks(&state, &session).await;
    let stats = feed.stats();
    Json(PicksResponse {
        picks: feed.picks,
        source: feed.source,
        stats,
    })
}

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// View id handed out when the page was rendered.
    pub view: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Ignored,
    Replied,
    Cancelled,
}

/// Response body for both chat endpoints.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChatStatus>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub view: String,
}

fn owned_view(state: &GatewayState, id: &str, session: &Session) -> Result<View, Response> {
    state
        .views
        .get_owned(id, &session.user.id)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "unknown view"))
}

/// POST /api/chat
///
/// Waits for the reply. If the view closes first, the user message stays
/// and no reply is appended.
pub async fn post_chat(
    State(state): State<GatewayState>,
    ApiSession(session): ApiSession,
    Json(body): Json<ChatRequest>,
) -> Response {
    let view = match owned_view(&state, &body.view, &session) {
        Ok(view) => view,
        Err(response) => return response,
    };

    let responder = state.responder(view.surface).clone();
    let submitted_at = Utc::now();
    let outcome = view
        .transcript
        .submit(&body.content, responder.as_ref(), &view.cancel)
        .await;

    let status = match outcome {
        SubmitOutcome::Ignored => ChatStatus::Ignored,
        SubmitOutcome::Cancelled => ChatStatus::Cancelled,
        SubmitOutcome::Replied(reply) => {
            if view.surface == ChatSurface::Genie && state.settings.persist_genie_messages {
                let mut prompt = ChatMessage::user(body.content.clone());
                prompt.timestamp = submitted_at;
                persist_exchange(&state, &session, [prompt, reply]).await;
            }
            ChatStatus::Replied
        }
    };
    debug!(view_id = %view.id, ?status, "chat submitted");

    Json(ChatResponse {
        status: Some(status),
        messages: view.transcript.messages(),
    })
    .into_response()
}

/// Best-effort write of one exchange to the `messages` table.
async fn persist_exchange(state: &GatewayState, session: &Session, messages: [ChatMessage; 2]) {
    for message in messages {
        let row = serde_json::json!({
            "user_id": session.user.id,
            "role": message.role,
            "content": message.content,
            "timestamp": message.timestamp,
        });
        if let Err(e) = state
            .data
            .insert("messages", row, Some(&session.access_token))
            .await
        {
            warn!(user_id = %session.user.id, error = %e, "could not store chat message");
            return;
        }
    }
}

/// GET /api/chat?view=
pub async fn get_chat(
    State(state): State<GatewayState>,
    ApiSession(session): ApiSession,
    Query(query): Query<ViewQuery>,
) -> Response {
    match owned_view(&state, &query.view, &session) {
        Ok(view) => Json(ChatResponse {
            status: None,
            messages: view.transcript.messages(),
        })
        .into_response(),
        Err(response) => response,
    }
}

/// GET /api/preferences
pub async fn get_preferences(
    State(state): State<GatewayState>,
    ApiSession(session): ApiSession,
) -> Json<UserPreferences> {
    let preferences = state
        .preferences
        .get(&session.user.id)
        .map(|p| p.clone())
        .unwrap_or_default();
    Json(preferences)
}

/// POST /api/preferences
///
/// Applies one field edit and returns the full preferences.
pub async fn post_preferences(
    State(state): State<GatewayState>,
    ApiSession(session): ApiSession,
    Json(change): Json<PreferenceChange>,
) -> Response {
    let mut entry = state.preferences.entry(session.user.id.clone()).or_default();
    match entry.apply(change) {
        Ok(()) => Json(entry.clone()).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Provider name to its status.
    pub providers: BTreeMap<String, String>,
}

fn describe(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(why) => format!("degraded: {why}"),
        HealthStatus::Unhealthy(why) => format!("unhealthy: {why}"),
    }
}

async fn check<A: PluginAdapter + ?Sized>(adapter: &A) -> HealthStatus {
    adapter
        .health_check()
        .await
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()))
}

/// GET /health
///
/// Liveness plus the provider health checks. Answers 503 when a provider is
/// unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (sessions, data) = tokio::join!(check(&*state.sessions), check(&*state.data));

    let mut providers = BTreeMap::new();
    providers.insert(format!("session:{}", state.sessions.name()), describe(&sessions));
    providers.insert(format!("data:{}", state.data.name()), describe(&data));

    let unhealthy = [&sessions, &data]
        .iter()
        .any(|s| matches!(s, HealthStatus::Unhealthy(_)));
    let degraded = [&sessions, &data]
        .iter()
        .any(|s| matches!(s, HealthStatus::Degraded(_)));
    let (code, status) = if unhealthy {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else if degraded {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        providers,
    };
    (code, Json(body)).into_response()
}
