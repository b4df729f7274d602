#![allow(clippy::unwrap_used)]
// Integration tests for `AuthSession` using wiremock.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use placeos_api::{AuthSession, Credentials, Error};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials {
        username: "support@place.tech".into(),
        password: SecretString::from("development".to_string()),
        client_id: "app-id".into(),
        client_secret: SecretString::from("app-secret".to_string()),
    }
}

async fn setup() -> (MockServer, AuthSession) {
    let server = MockServer::start().await;
    let host = Url::parse(&server.uri()).unwrap();
    let session = AuthSession::with_client(reqwest::Client::new(), &host, credentials()).unwrap();
    (server, session)
}

fn token_body(access: &str, expires_in: u64, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "refresh_token": refresh,
        "scope": "public",
        "created_at": 1_626_781_157
    })
}

// ── Password grant ──────────────────────────────────────────────────

#[tokio::test]
async fn test_authorize_sends_password_grant_with_basic_auth() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(basic_auth("app-id", "app-secret"))
        .and(body_json(json!({
            "grant_type": "password",
            "username": "support@place.tech",
            "password": "development",
            "scope": "public"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 7200, "ref-1")))
        .expect(1)
        .mount(&server)
        .await;

    let token = session.authorize().await.unwrap();
    assert_eq!(token.access_token.expose_secret(), "tok-1");
    assert_eq!(token.expires_in, Some(7200));
    assert_eq!(token.created_at, Some(1_626_781_157));

    // Fresh token is reused without another exchange.
    let bearer = session.bearer().await.unwrap();
    assert_eq!(bearer.expose_secret(), "tok-1");
}

#[tokio::test]
async fn test_authorize_rejected_credentials() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let result = session.authorize().await;
    match result {
        Err(Error::Authentication { message }) => assert!(message.contains("invalid_grant")),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(session.token().await.is_none());
}

#[tokio::test]
async fn test_authorize_malformed_body() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let result = session.authorize().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_authorize_empty_access_token() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("", 7200, "")))
        .mount(&server)
        .await;

    let result = session.authorize().await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_unreachable_host_is_authentication_error() {
    let host = Url::parse("http://127.0.0.1:1").unwrap();
    let session = AuthSession::with_client(reqwest::Client::new(), &host, credentials()).unwrap();

    let result = session.bearer().await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_below_threshold_uses_refresh_grant() {
    let (server, session) = setup().await;
    let session = session.with_refresh_threshold(Duration::from_secs(60));

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_partial_json(json!({"grant_type": "password"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-short", 30, "ref-1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(basic_auth("app-id", "app-secret"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "ref-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-long", 7200, "ref-2")))
        .expect(1)
        .mount(&server)
        .await;

    let first = session.bearer().await.unwrap();
    assert_eq!(first.expose_secret(), "tok-short");

    // 30s left is under the 60s threshold: refreshed before use.
    let second = session.bearer().await.unwrap();
    assert_eq!(second.expose_secret(), "tok-long");

    let third = session.bearer().await.unwrap();
    assert_eq!(third.expose_secret(), "tok-long");
}

#[tokio::test]
async fn test_failed_refresh_falls_back_to_password_grant() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_partial_json(json!({"grant_type": "refresh_token"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_partial_json(json!({"grant_type": "password"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-short", 10, "ref-1")))
        .expect(2)
        .mount(&server)
        .await;

    session.authorize().await.unwrap();
    let bearer = session.bearer().await.unwrap();
    assert_eq!(bearer.expose_secret(), "tok-short");
}

#[tokio::test]
async fn test_invalidate_forces_new_grant() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 7200, "")))
        .expect(2)
        .mount(&server)
        .await;

    session.bearer().await.unwrap();
    session.invalidate().await;
    assert!(session.token().await.is_none());
    session.bearer().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_callers_share_one_exchange() {
    let (server, session) = setup().await;
    let session = std::sync::Arc::new(session);

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok-1", 7200, "ref-1"))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (a, b) = tokio::join!(session.bearer(), session.bearer());
    assert_eq!(a.unwrap().expose_secret(), "tok-1");
    assert_eq!(b.unwrap().expose_secret(), "tok-1");
}
