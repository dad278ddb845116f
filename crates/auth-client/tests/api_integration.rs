//! Integration tests for the auth API client
//!
//! These tests use wiremock to stand in for the auth server and exercise the
//! full path: session store → bearer injection → HTTP → error normalization.

use auth_client::{
    ApiClientConfig, AuthApi, AuthError, HttpAuthApi, Profile, SessionStore,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use storage::MemoryKvStore;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> (SessionStore, HttpAuthApi) {
    let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
    let config = ApiClientConfig::new(server.uri());
    let api = HttpAuthApi::new(config, session.clone()).unwrap();
    (session, api)
}

// =============================================================================
// Login / Signup
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "email": "a@b.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc",
            "user": { "id": 1, "email": "a@b.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let session = api.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(session.token, "abc");
    assert_eq!(
        session.profile,
        Some(Profile::new(json!({ "id": 1, "email": "a@b.com" })))
    );
}

#[tokio::test]
async fn test_login_rejected_uses_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api.login("a@b.com", "wrongpass").await.unwrap_err();

    assert!(error.is_rejected());
    assert_eq!(error.message(), "Invalid credentials");
    assert_eq!(error.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_login_missing_token_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": 1 } })))
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api.login("a@b.com", "secret1").await.unwrap_err();

    assert_eq!(
        error,
        AuthError::InvalidResponse("Invalid response from server".to_string())
    );
}

#[tokio::test]
async fn test_login_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api.login("a@b.com", "secret1").await.unwrap_err();

    assert!(matches!(error, AuthError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_signup_sends_name_and_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "secret1",
            "name": "New User"
        })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api
        .signup("new@example.com", "secret1", "New User")
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert_eq!(error.message(), "Signup failed");
    assert_eq!(error.server_message(), None);
}

#[tokio::test]
async fn test_signup_conflict_uses_error_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "Email already registered" })),
        )
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api
        .signup("taken@example.com", "secret1", "Taken")
        .await
        .unwrap_err();

    assert!(matches!(error, AuthError::Api { status: 409, .. }));
    assert_eq!(error.message(), "Email already registered");
}

// =============================================================================
// Bearer token handling
// =============================================================================

#[tokio::test]
async fn test_bearer_header_sent_when_token_stored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "a@b.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, api) = setup(&server);
    session.store_token("abc").await.unwrap();

    let profile = api.get_profile().await.unwrap();
    assert_eq!(profile.email(), Some("a@b.com"));
    assert_eq!(profile.id(), Some("1".to_string()));
}

#[tokio::test]
async fn test_null_profile_body_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let (session, api) = setup(&server);
    session.store_token("abc").await.unwrap();

    let error = api.get_profile().await.unwrap_err();
    assert_eq!(
        error,
        AuthError::InvalidResponse("Invalid response from server".to_string())
    );
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_bearer_header_omitted_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    api.logout().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_profile_clears_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .mount(&server)
        .await;

    let (session, api) = setup(&server);
    session.store_token("stale").await.unwrap();
    assert!(session.is_authenticated().await);

    let error = api.get_profile().await.unwrap_err();

    assert!(error.is_rejected());
    assert_eq!(error.message(), "Token expired");
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_unauthorized_keeps_cached_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (session, api) = setup(&server);
    let cached = Profile::new(json!({ "id": 1 }));
    session.store_token("stale").await.unwrap();
    session.store_profile(&cached).await.unwrap();

    let error = api.get_profile().await.unwrap_err();
    assert_eq!(error.message(), "Failed to get profile");

    assert_eq!(session.get_token().await, None);
    assert_eq!(session.get_profile().await, Some(cached));
}

#[tokio::test]
async fn test_other_errors_keep_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (session, api) = setup(&server);
    session.store_token("abc").await.unwrap();

    let error = api.get_profile().await.unwrap_err();
    assert_eq!(error.status(), Some(503));
    assert!(session.is_authenticated().await);
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
    let config = ApiClientConfig::new("http://127.0.0.1:1/api").with_timeout(Duration::from_secs(2));
    let api = HttpAuthApi::new(config, session).unwrap();

    let error = api.login("a@b.com", "secret1").await.unwrap_err();

    assert!(matches!(error, AuthError::Transport { .. }));
    assert_eq!(error.message(), "Login failed");
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 1 }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
    let config = ApiClientConfig::new(server.uri()).with_timeout(Duration::from_millis(200));
    let api = HttpAuthApi::new(config, session).unwrap();

    let error = api.get_profile().await.unwrap_err();
    assert!(matches!(error, AuthError::Transport { .. }));
    assert_eq!(error.message(), "Failed to get profile");
}

#[tokio::test]
async fn test_logout_failure_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    let error = api.logout().await.unwrap_err();
    assert_eq!(error.message(), "Logout failed");
}

#[tokio::test]
async fn test_no_automatic_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (_, api) = setup(&server);
    assert!(api.login("a@b.com", "secret1").await.is_err());
}
