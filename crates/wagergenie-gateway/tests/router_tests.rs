// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests: every request goes through the full middleware stack
//! against in-memory providers.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use futures::StreamExt;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wagergenie_chat::ChatSurface;
use wagergenie_config::GenieConfig;
use wagergenie_core::traits::{DataProvider, SessionProvider};
use wagergenie_core::types::Session;
use wagergenie_gateway::{GatewayState, build_router};
use wagergenie_test_utils::{MockDataProvider, MockSessionProvider};

const EMAIL: &str = "fan@example.com";
const PASSWORD: &str = "hunter22";

struct Harness {
    provider: Arc<MockSessionProvider>,
    data: MockDataProvider,
    state: GatewayState,
    app: Router,
}

impl Harness {
    fn new() -> Self {
        Self::with(
            MockSessionProvider::new().with_user(EMAIL, PASSWORD),
            MockDataProvider::new(),
        )
    }

    fn with(provider: MockSessionProvider, data: MockDataProvider) -> Self {
        let mut config = GenieConfig::default();
        config.chat.reply_delay_ms = 0;
        config.server.public_url = Some("https://wagergenie.test".into());

        let provider = Arc::new(provider);
        let sessions: Arc<dyn SessionProvider> = provider.clone();
        let tables: Arc<dyn DataProvider> = Arc::new(data.clone());
        let state = GatewayState::new(&config, sessions, tables, CancellationToken::new()).unwrap();
        let app = build_router(state.clone());
        Self {
            provider,
            data,
            state,
            app,
        }
    }

    fn session(&self) -> Session {
        self.provider.issue_session(EMAIL).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, session: Option<&Session>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(session) = session {
            request = request.header(header::COOKIE, cookie_header(session));
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, form: &str, session: Option<&Session>) -> Response<Body> {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::HOST, "localhost:3000");
        if let Some(session) = session {
            request = request.header(header::COOKIE, cookie_header(session));
        }
        self.send(request.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn post_json(&self, uri: &str, body: Value, session: Option<&Session>) -> Response<Body> {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(session) = session {
            request = request.header(header::COOKIE, cookie_header(session));
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

fn cookie_header(session: &Session) -> String {
    let mut cookie = format!("wg-access-token={}", session.access_token.expose_secret());
    if let Some(refresh) = &session.refresh_token {
        cookie.push_str(&format!("; wg-refresh-token={}", refresh.expose_secret()));
    }
    cookie
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ---- Route guard ----

#[tokio::test]
async fn test_signed_out_dashboard_redirects_to_entry() {
    let h = Harness::new();
    let response = h.get("/app/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_signed_out_redirect_forwards_error_param() {
    let h = Harness::new();
    let response = h.get("/app/settings?error=Token%20expired", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/?error=Token+expired");
}

#[tokio::test]
async fn test_signed_in_entry_and_callback_redirect_to_dashboard() {
    let h = Harness::new();
    let session = h.session();
    for uri in ["/", "/auth/callback?token_hash=x&type=magiclink"] {
        let response = h.get(uri, Some(&session)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location(&response), "/app/dashboard", "{uri}");
    }
}

#[tokio::test]
async fn test_signed_in_app_pages_pass() {
    let h = Harness::new();
    let session = h.session();

    let response = h.get("/app/chat", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Chat with WagerGenie"));

    let response = h.get("/app", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/app/dashboard");
}

#[tokio::test]
async fn test_lookup_failure_redirects_once_with_generic_error() {
    let h = Harness::new();
    let session = h.session();
    h.provider.set_fail_lookups(true);

    let response = h.get("/app/dashboard", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/?error=An+error+occurred+during+authentication"
    );

    let response = h
        .get("/?error=An+error+occurred+during+authentication", Some(&session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("An error occurred during authentication")
    );
}

#[tokio::test]
async fn test_refreshed_tokens_are_written_back() {
    let h = Harness::new();
    let session = h.session();
    h.provider
        .revoke_access_token(session.access_token.expose_secret());

    let response = h.get("/app/dashboard", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let access = cookies
        .iter()
        .find(|c| c.starts_with("wg-access-token="))
        .expect("rotated access cookie");
    assert!(!access.contains(session.access_token.expose_secret()));
    assert!(access.contains("HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("wg-refresh-token=")));
}

#[tokio::test]
async fn test_dead_cookies_are_cleared_on_entry_page() {
    let h = Harness::new();
    let session = h.session();
    h.provider.sign_out(&session).await.unwrap();

    let response = h.get("/", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

// ---- Pages ----

#[tokio::test]
async fn test_dashboard_shows_user_rows_in_order() {
    let data = MockDataProvider::new();
    let h = Harness::with(
        MockSessionProvider::new().with_user(EMAIL, PASSWORD),
        data.clone(),
    );
    let session = h.session();
    let user_id = session.user.id.clone();
    h.data
        .insert(
            "picks",
            json!({"id": 1, "user_id": user_id, "question": "Older question", "answer": "A", "confidence": 60, "created_at": "2026-01-01T00:00:00Z"}),
            None,
        )
        .await
        .unwrap();
    h.data
        .insert(
            "picks",
            json!({"id": 2, "user_id": user_id, "question": "Newer question", "answer": "B", "confidence": 80, "created_at": "2026-02-01T00:00:00Z"}),
            None,
        )
        .await
        .unwrap();
    h.data
        .insert(
            "picks",
            json!({"id": 3, "user_id": "someone-else", "question": "Not mine", "answer": "C", "confidence": 10, "created_at": "2026-03-01T00:00:00Z"}),
            None,
        )
        .await
        .unwrap();

    let response = h.get("/app/dashboard", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    let newer = html.find("Newer question").expect("newer pick shown");
    let older = html.find("Older question").expect("older pick shown");
    assert!(newer < older);
    assert!(!html.contains("Not mine"));
    assert!(!html.contains("Kansas City Chiefs"));
    assert!(html.contains("70%"));

    let (query, token) = data.queries().pop().unwrap();
    assert_eq!(query.table, "picks");
    assert_eq!(query.limit, Some(10));
    assert_eq!(token.as_deref(), Some(session.access_token.expose_secret()));
}

fn full_pick_row(id: u32, user_id: &str, matchup: &str, day: u32) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "sport": "NBA",
        "match": matchup,
        "question": null,
        "prediction": "Home -4.5",
        "answer": null,
        "confidence": 70,
        "result": "pending",
        "explanation": "Rest edge.",
        "date": format!("2026-01-{day:02}T00:00:00Z"),
        "created_at": format!("2026-01-{day:02}T09:30:00Z")
    })
}

#[tokio::test]
async fn test_full_table_rows_reach_dashboard_and_genie() {
    let h = Harness::new();
    let session = h.session();
    let user_id = session.user.id.clone();
    for row in [
        full_pick_row(1, &user_id, "Nets vs. Magic", 3),
        full_pick_row(2, &user_id, "Suns vs. Jazz", 5),
    ] {
        h.data.insert("picks", row, None).await.unwrap();
    }
    h.data
        .insert(
            "messages",
            json!({
                "id": 7,
                "user_id": user_id,
                "role": "user",
                "content": "Stored question about the Suns",
                "timestamp": "2026-01-05T10:00:00Z",
                "created_at": "2026-01-05T10:00:00Z"
            }),
            None,
        )
        .await
        .unwrap();

    let html = body_text(h.get("/app/dashboard", Some(&session)).await).await;
    let newer = html.find("Suns vs. Jazz").expect("newer pick shown");
    let older = html.find("Nets vs. Magic").expect("older pick shown");
    assert!(newer < older);
    assert!(!html.contains("Showing sample picks"));

    let html = body_text(h.get("/genie", Some(&session)).await).await;
    let newer = html.find("Suns vs. Jazz").expect("newer pick on genie");
    let older = html.find("Nets vs. Magic").expect("older pick on genie");
    assert!(newer < older);
    assert!(!html.contains("Kansas City Chiefs"));

    let html = body_text(h.get("/genie?tab=chat", Some(&session)).await).await;
    assert!(html.contains("Stored question about the Suns"));
}

#[tokio::test]
async fn test_dashboard_falls_back_to_samples() {
    let h = Harness::new();
    let session = h.session();
    let html = body_text(h.get("/app/dashboard", Some(&session)).await).await;
    assert!(html.contains("Kansas City Chiefs vs. Baltimore Ravens"));
    assert!(html.contains("Showing sample picks"));
}

#[tokio::test]
async fn test_genie_checks_session_itself() {
    let h = Harness::new();
    let response = h.get("/genie", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    let session = h.session();
    let response = h.get("/genie?tab=packages", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Infinite Wishes"));
    assert!(html.contains("$199"));
}

#[tokio::test]
async fn test_settings_shows_email() {
    let h = Harness::new();
    let session = h.session();
    let html = body_text(h.get("/app/settings", Some(&session)).await).await;
    assert!(html.contains("Email: fan@example.com"));
    assert!(html.contains("Conservative"));
}

// ---- Auth flows ----

#[tokio::test]
async fn test_sign_in_sets_cookies_and_goes_to_genie() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/sign-in", "email=fan%40example.com&password=hunter22", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/genie");
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("wg-access-token=at-"))
    );
}

#[tokio::test]
async fn test_sign_in_error_is_shown_verbatim() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/sign-in", "email=fan%40example.com&password=wrong", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert!(body_text(response).await.contains("Invalid login credentials"));
}

#[tokio::test]
async fn test_sign_up_existing_account_is_not_signed_in() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/sign-up", "email=fan%40example.com&password=hunter22", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert!(body_text(response).await.contains("User already registered"));
}

#[tokio::test]
async fn test_sign_up_with_auto_confirm_goes_to_genie() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/sign-up", "email=new%40example.com&password=secret1", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/genie");
    assert!(!set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_sign_up_needing_confirmation_shows_notice() {
    let h = Harness::with(
        MockSessionProvider::new().requiring_confirmation(),
        MockDataProvider::new(),
    );
    let response = h
        .post_form("/auth/sign-up", "email=new%40example.com&password=secret1", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Check your email to confirm your account.")
    );
}

#[tokio::test]
async fn test_sign_up_rejects_short_password() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/sign-up", "email=new%40example.com&password=123", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("at least 6 characters"));
}

#[tokio::test]
async fn test_magic_link_targets_callback() {
    let h = Harness::new();
    let response = h
        .post_form("/auth/magic-link", "email=fan%40example.com", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        h.provider.sent_links(),
        vec![(
            EMAIL.to_string(),
            "https://wagergenie.test/auth/callback".to_string()
        )]
    );
}

#[tokio::test]
async fn test_callback_verifies_link() {
    let h = Harness::new();
    h.provider.add_otp("hash-1", EMAIL);

    let response = h
        .get("/auth/callback?token_hash=hash-1&type=magiclink", None)
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/app/dashboard");
    assert!(!set_cookies(&response).is_empty());

    // Hashes are single use.
    let response = h
        .get("/auth/callback?token_hash=hash-1&type=magiclink", None)
        .await;
    assert_eq!(
        location(&response),
        "/?error=Email+link+is+invalid+or+has+expired"
    );
}

#[tokio::test]
async fn test_sign_out_revokes_and_clears() {
    let h = Harness::new();
    let session = h.session();
    let mut events = h.provider.subscribe();

    let response = h.post_form("/auth/sign-out", "", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(
        set_cookies(&response)
            .iter()
            .all(|c| c.contains("Max-Age=0"))
    );

    let event = events.recv().await.unwrap();
    assert!(event.invalidates());
    assert_eq!(event.user_id(), session.user.id);

    let response = h.get("/app/dashboard", Some(&session)).await;
    assert_eq!(location(&response), "/");
}

// ---- JSON API ----

#[tokio::test]
async fn test_api_requires_session() {
    let h = Harness::new();
    let response = h.get("/api/picks", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "not signed in");
}

#[tokio::test]
async fn test_api_picks_reports_sample_source() {
    let h = Harness::new();
    let session = h.session();
    let body = body_json(h.get("/api/picks", Some(&session)).await).await;
    assert_eq!(body["source"], "sample");
    assert_eq!(body["picks"].as_array().unwrap().len(), 6);
    assert_eq!(body["stats"]["total"], 6);
}

#[tokio::test]
async fn test_chat_appends_user_then_assistant() {
    let h = Harness::new();
    let session = h.session();
    let view = h.state.views.open(ChatSurface::App, &session.user.id);

    let body = body_json(
        h.post_json(
            "/api/chat",
            json!({"view": view.id, "content": "Any NFL picks?"}),
            Some(&session),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], "replied");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Any NFL picks?");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(
        messages[1]["content"],
        "I am WagerGenie, your AI betting assistant. How can I help you today?"
    );

    let body = body_json(
        h.post_json(
            "/api/chat",
            json!({"view": view.id, "content": "   "}),
            Some(&session),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_rejects_other_users_view() {
    let h = Harness::new();
    let session = h.session();
    let view = h.state.views.open(ChatSurface::App, "user-somebody-else");

    let response = h
        .post_json(
            "/api/chat",
            json!({"view": view.id, "content": "hi"}),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(view.transcript.is_empty());
}

#[tokio::test]
async fn test_closed_view_gets_no_reply() {
    let h = Harness::new();
    let session = h.session();
    let view = h.state.views.open(ChatSurface::App, &session.user.id);
    let id = view.id.clone();
    assert!(h.state.views.close(&id));

    let response = h
        .post_json("/api/chat", json!({"view": id, "content": "hi"}), Some(&session))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genie_exchange_is_persisted() {
    let h = Harness::new();
    let session = h.session();
    let view = h.state.views.open(ChatSurface::Genie, &session.user.id);

    let response = h
        .post_json(
            "/api/chat",
            json!({"view": view.id, "content": "NBA tonight?"}),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = h.data.rows("messages");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["role"], "user");
    assert_eq!(rows[0]["content"], "NBA tonight?");
    assert_eq!(rows[1]["role"], "assistant");
    assert_eq!(rows[1]["user_id"], session.user.id.as_str());
}

#[tokio::test]
async fn test_preferences_round_trip() {
    let h = Harness::new();
    let session = h.session();

    let response = h
        .post_json(
            "/api/preferences",
            json!({"key": "favorite_sport", "sport": "nba", "selected": true}),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let prefs = body_json(response).await;
    assert_eq!(prefs["favorite_sports"], json!(["NBA"]));

    h.post_json(
        "/api/preferences",
        json!({"key": "risk_tolerance", "level": "high"}),
        Some(&session),
    )
    .await;
    let prefs = body_json(h.get("/api/preferences", Some(&session)).await).await;
    assert_eq!(prefs["risk_tolerance"], "high");
    assert_eq!(prefs["email_notifications"], true);

    let response = h
        .post_json(
            "/api/preferences",
            json!({"key": "favorite_sport", "sport": "Curling", "selected": true}),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_providers() {
    let h = Harness::new();
    let response = h.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"]["session:mock-session"], "healthy");
}

// ---- Session events ----

#[tokio::test]
async fn test_event_stream_announces_sign_out_and_closes_view() {
    let h = Harness::new();
    let session = h.session();
    let view = h.state.views.open(ChatSurface::App, &session.user.id);
    let uri = format!("/app/events?view={}", view.id);

    let response = h.get(&uri, Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // A second stream for the same view is refused.
    let again = h.get(&uri, Some(&session)).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let mut frames = response.into_body().into_data_stream();
    let ready = frames.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&ready).contains("event: ready"));

    h.provider.sign_out(&session).await.unwrap();
    let invalidated = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&invalidated);
    assert!(text.contains("event: invalidated"));
    assert!(text.contains("signed_out"));

    drop(frames);
    assert!(h.state.views.get(&view.id).is_none());
    assert!(view.cancel.is_cancelled());
}

#[tokio::test]
async fn test_event_stream_needs_session() {
    let h = Harness::new();
    let response = h.get("/app/events", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}
