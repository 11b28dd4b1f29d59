// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end provider behavior against a mocked hosted project.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use wagergenie_core::traits::{DataProvider, PluginAdapter, SessionProvider};
use wagergenie_core::types::{
    HealthStatus, OtpKind, SelectQuery, SessionEvent, SessionTokens, SignUpMetadata,
};
use wagergenie_supabase::SupabaseProvider;
use wagergenie_supabase::client::SupabaseClient;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> SupabaseProvider {
    let client = SupabaseClient::new(
        &server.uri(),
        SecretString::from("anon-key"),
        Duration::from_secs(5),
    )
    .unwrap();
    SupabaseProvider::with_client(client)
}

fn token_body(access: &str, user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": format!("{access}-refresh"),
        "expires_in": 3600,
        "user": {"id": user_id, "email": "fan@example.com", "user_metadata": {"plan": "free"}}
    })
}

#[tokio::test]
async fn valid_access_token_yields_session_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "u1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let tokens = SessionTokens {
        access_token: SecretString::from("at"),
        refresh_token: Some(SecretString::from("rt")),
    };
    let session = provider.get_session(&tokens).await.unwrap().unwrap();
    assert_eq!(session.user.id, "u1");
    assert_eq!(session.access_token.expose_secret(), "at");
}

#[tokio::test]
async fn accepted_jwt_carries_its_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "u1"})),
        )
        .mount(&server)
        .await;

    let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"u1","exp":1767225600}"#);
    let access = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig");
    let provider = provider(&server);
    let tokens = SessionTokens {
        access_token: SecretString::from(access),
        refresh_token: None,
    };
    let session = provider.get_session(&tokens).await.unwrap().unwrap();
    let expires_at = session.expires_at.expect("expiry from the exp claim");
    assert_eq!(expires_at.timestamp(), 1_767_225_600);
}

#[tokio::test]
async fn rejected_access_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(serde_json::json!({"refresh_token": "rt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "u1")))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut events = provider.subscribe();
    let tokens = SessionTokens {
        access_token: SecretString::from("stale"),
        refresh_token: Some(SecretString::from("rt")),
    };
    let session = provider.get_session(&tokens).await.unwrap().unwrap();
    assert_eq!(session.access_token.expose_secret(), "fresh");
    assert!(session.expires_at.is_some());
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::TokenRefreshed {
            user_id: "u1".into()
        }
    );
}

#[tokio::test]
async fn rejected_tokens_without_refresh_are_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let tokens = SessionTokens {
        access_token: SecretString::from("stale"),
        refresh_token: None,
    };
    assert!(provider.get_session(&tokens).await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_refresh_token_is_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            serde_json::json!({"error_description": "Invalid Refresh Token"}),
        ))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let tokens = SessionTokens {
        access_token: SecretString::from("stale"),
        refresh_token: Some(SecretString::from("used")),
    };
    assert!(provider.get_session(&tokens).await.unwrap().is_none());
}

#[tokio::test]
async fn sign_in_and_sign_out_broadcast_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("at", "u7")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let mut events = provider.subscribe();
    let session = provider
        .sign_in_with_password("fan@example.com", &SecretString::from("pw"))
        .await
        .unwrap();
    provider.sign_out(&session).await.unwrap();

    let first = events.recv().await.unwrap();
    let second = events.recv().await.unwrap();
    assert_eq!(first, SessionEvent::SignedIn { user_id: "u7".into() });
    assert!(second.invalidates());
    assert_eq!(second.user_id(), "u7");
}

#[tokio::test]
async fn sign_up_sends_metadata_and_handles_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_json(serde_json::json!({
            "email": "fan@example.com",
            "password": "pw",
            "data": {"username": "fan", "plan": "free"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": "u9", "email": "fan@example.com"}),
        ))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let outcome = provider
        .sign_up(
            "fan@example.com",
            &SecretString::from("pw"),
            &SignUpMetadata::from_email("fan@example.com"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.user.unwrap().id, "u9");
    assert!(outcome.session.is_none());
}

#[tokio::test]
async fn sign_up_error_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(
            serde_json::json!({"code": 422, "msg": "User already registered"}),
        ))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let err = provider
        .sign_up(
            "fan@example.com",
            &SecretString::from("pw"),
            &SignUpMetadata::from_email("fan@example.com"),
        )
        .await
        .err()
        .unwrap();
    assert_eq!(err.user_message(), "User already registered");
}

#[tokio::test]
async fn magic_link_and_verify() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(query_param("redirect_to", "http://localhost:3000/auth/callback"))
        .and(body_json(
            serde_json::json!({"email": "fan@example.com", "create_user": true}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/verify"))
        .and(body_json(
            serde_json::json!({"type": "magiclink", "token_hash": "hash"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("at", "u3")))
        .mount(&server)
        .await;

    let provider = provider(&server);
    provider
        .sign_in_with_otp("fan@example.com", "http://localhost:3000/auth/callback")
        .await
        .unwrap();
    let session = provider
        .verify_otp("hash", OtpKind::Magiclink)
        .await
        .unwrap();
    assert_eq!(session.user.id, "u3");
}

#[tokio::test]
async fn data_provider_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/picks"))
        .and(query_param("order", "date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "sport": "NBA"},
            {"id": 2, "sport": "NFL"}
        ])))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let rows = provider
        .select(&SelectQuery::table("picks").order("date", false), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["sport"], "NFL");
}

#[tokio::test]
async fn health_reflects_auth_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider(&server);
    assert!(matches!(
        provider.health_check().await.unwrap(),
        HealthStatus::Unhealthy(_)
    ));
}
