// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events stream for GET /app/events.
//!
//! Each rendered page opens this stream for as long as it is displayed.
//!
//! ```text
//! event: ready
//! data: {"view": "..."}
//!
//! event: invalidated
//! data: {"reason": "signed_out"}
//! ```
//!
//! The stream owns the page's view: when the browser disconnects the stream
//! is dropped, which releases the provider subscription and cancels any chat
//! reply still in flight for that view.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::server::GatewayState;
use crate::session::PageSession;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub view: Option<String>,
}

/// GET /app/events?view=
///
/// `view` is optional: pages without a chat transcript only need the
/// invalidation signal.
pub async fn session_events(
    State(state): State<GatewayState>,
    PageSession(session): PageSession,
    Query(query): Query<EventsQuery>,
) -> Response {
    let guard = match query.view.as_deref() {
        Some(id) => {
            if state.views.get_owned(id, &session.user.id).is_none() {
                return (StatusCode::NOT_FOUND, "unknown view").into_response();
            }
            match state.views.attach(id) {
                Some(guard) => Some(guard),
                None => return (StatusCode::CONFLICT, "view already attached").into_response(),
            }
        }
        None => None,
    };

    let ready = serde_json::json!({ "view": query.view }).to_string();
    let user_id = session.user.id.clone();
    let invalidated = state.gate.on_invalidate(&session).map(move |reason| {
        debug!(user_id = %user_id, reason = reason.as_str(), "page session invalidated");
        Event::default()
            .event("invalidated")
            .data(serde_json::json!({ "reason": reason.as_str() }).to_string())
    });

    let events = stream::once(async move { Event::default().event("ready").data(ready) })
        .chain(invalidated)
        .take_until(state.shutdown.clone().cancelled_owned())
        .map(move |event| {
            // Keeps the view open for as long as the stream lives.
            let _view = &guard;
            Ok::<_, Infallible>(event)
        });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
