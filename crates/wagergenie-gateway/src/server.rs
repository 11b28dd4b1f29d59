// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use wagergenie_chat::{CannedResponder, ChatSurface, ViewRegistry};
use wagergenie_config::model::GenieConfig;
use wagergenie_core::GenieError;
use wagergenie_core::traits::{ChatResponder, DataProvider, SessionProvider};
use wagergenie_core::types::UserPreferences;

use crate::gate::SessionGate;
use crate::guard::route_guard;
use crate::session::session_cookies_layer;
use crate::views::Pages;
use crate::{auth, handlers, pages, sse};

/// Views whose page never opened its event stream are closed after this.
pub const UNATTACHED_VIEW_TTL: Duration = Duration::from_secs(300);

/// Request-independent settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub app_name: String,
    pub picks_limit: usize,
    pub secure_cookies: bool,
    /// Base URL used for links the provider emails out.
    pub public_url: Option<String>,
    pub persist_genie_messages: bool,
    /// Chat reply shown by the page when a request fails.
    pub error_reply: String,
}

impl GatewaySettings {
    pub fn from_config(config: &GenieConfig) -> Self {
        Self {
            app_name: config.app.name.clone(),
            picks_limit: config.dashboard.picks_limit,
            secure_cookies: config.server.secure_cookies,
            public_url: config
                .server
                .public_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            persist_genie_messages: config.chat.persist_genie_messages,
            error_reply: config.chat.error_reply.clone(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The one session provider instance for the process.
    pub sessions: Arc<dyn SessionProvider>,
    /// Table reads and writes.
    pub data: Arc<dyn DataProvider>,
    pub gate: SessionGate,
    /// Open page views and their chat transcripts.
    pub views: ViewRegistry,
    pub app_responder: Arc<dyn ChatResponder>,
    pub genie_responder: Arc<dyn ChatResponder>,
    /// In-process preference store, keyed by user id.
    pub preferences: Arc<DashMap<String, UserPreferences>>,
    pub pages: Arc<Pages>,
    pub settings: Arc<GatewaySettings>,
    /// Cancelled when the process begins shutting down.
    pub shutdown: CancellationToken,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    /// Wire the providers and the canned responders from `config`.
    pub fn new(
        config: &GenieConfig,
        sessions: Arc<dyn SessionProvider>,
        data: Arc<dyn DataProvider>,
        shutdown: CancellationToken,
    ) -> Result<Self, GenieError> {
        let app_responder: Arc<dyn ChatResponder> =
            Arc::new(CannedResponder::for_surface(&config.chat, ChatSurface::App));
        let genie_responder: Arc<dyn ChatResponder> =
            Arc::new(CannedResponder::for_surface(&config.chat, ChatSurface::Genie));
        Ok(Self {
            gate: SessionGate::new(sessions.clone()),
            sessions,
            data,
            views: ViewRegistry::new(shutdown.clone()).with_error_reply(&config.chat.error_reply),
            app_responder,
            genie_responder,
            preferences: Arc::new(DashMap::new()),
            pages: Arc::new(Pages::new()?),
            settings: Arc::new(GatewaySettings::from_config(config)),
            shutdown,
            start_time: Instant::now(),
        })
    }

    /// Replace the responder for one chat surface.
    pub fn with_responder(
        mut self,
        surface: ChatSurface,
        responder: Arc<dyn ChatResponder>,
    ) -> Self {
        match surface {
            ChatSurface::App => self.app_responder = responder,
            ChatSurface::Genie => self.genie_responder = responder,
        }
        self
    }

    pub fn responder(&self, surface: ChatSurface) -> &Arc<dyn ChatResponder> {
        match surface {
            ChatSurface::App => &self.app_responder,
            ChatSurface::Genie => &self.genie_responder,
        }
    }
}

/// Build the full router.
///
/// Layers run outermost first: CORS, request tracing, the session cookie
/// writer, then the route guard.
pub fn build_router(state: GatewayState) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::landing))
        .route("/app", get(pages::app_root))
        .route("/app/dashboard", get(pages::dashboard))
        .route("/app/chat", get(pages::chat))
        .route("/app/settings", get(pages::settings))
        .route("/app/events", get(sse::session_events))
        .route("/genie", get(pages::genie));

    let auth_routes = Router::new()
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/magic-link", post(auth::magic_link))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/callback", get(auth::callback));

    let api_routes = Router::new()
        .route("/api/picks", get(handlers::get_picks))
        .route("/api/chat", get(handlers::get_chat).post(handlers::post_chat))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).post(handlers::post_preferences),
        );

    Router::new()
        .merge(page_routes)
        .merge(auth_routes)
        .merge(api_routes)
        .route("/health", get(handlers::get_health))
        .layer(axum_middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_cookies_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Close views that never connected, until shutdown.
pub fn spawn_view_reaper(views: ViewRegistry, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(UNATTACHED_VIEW_TTL / 2);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tick.tick() => {
                    views.reap_unattached(UNATTACHED_VIEW_TTL);
                }
            }
        }
        debug!("view reaper stopped");
    });
}

/// Bind `host:port` and serve until `state.shutdown` is cancelled.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), GenieError> {
    let shutdown = state.shutdown.clone();
    spawn_view_reaper(state.views.clone(), shutdown.clone());
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GenieError::Provider {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("WagerGenie listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| GenieError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}
