//! End-to-end session flow tests
//!
//! These tests assemble the whole app over an on-disk sled store and a
//! wiremock auth server, then walk through login, restart, profile refresh
//! and logout the way a user would.

use app_core::{Credentials, SignupFields};
use app_state::AuthStatus;
use app_ui::{Route, ScreenOutcome};
use auth_starter::{App, AppConfig};
use serde_json::json;
use storage::KvConfig;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(dir: &TempDir, server: &MockServer) -> AppConfig {
    let db_path = dir.path().join("kv.db").to_string_lossy().to_string();
    AppConfig::new(db_path.clone())
        .storage(KvConfig::new(db_path).flush_every_ms(None))
        .api_base_url(server.uri())
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc",
            "user": { "id": 1, "email": "a@b.com", "createdAt": "2024-01-01T00:00:00Z" }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_survives_restart() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;

    // First launch: no token, so Login
    {
        let mut app = App::open(config(&dir, &server)).unwrap();
        assert_eq!(app.start().await, Some(Route::Login));

        let outcome = app.login(&Credentials::new("a@b.com", "secret1")).await;
        assert_eq!(outcome, ScreenOutcome::Navigated(Route::Home));
        assert_eq!(app.current_route(), Route::Home);
        assert_eq!(app.status(), AuthStatus::Authenticated);
    }

    // Second launch: token on disk, so Home with the cached profile
    let mut app = App::open(config(&dir, &server)).unwrap();
    assert_eq!(app.start().await, Some(Route::Home));
    assert_eq!(app.session().get_token().await, Some("abc".to_string()));

    match app.load_profile().await {
        ScreenOutcome::Updated(profile) => {
            assert_eq!(profile.email(), Some("a@b.com"));
            assert_eq!(profile.created_at(), Some("2024-01-01T00:00:00Z"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_login_never_reaches_server() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = App::open(config(&dir, &server)).unwrap();
    app.start().await;

    let outcome = app.login(&Credentials::new("bad-email", "secret1")).await;
    assert!(matches!(outcome, ScreenOutcome::FieldErrors(_)));
    assert_eq!(app.current_route(), Route::Login);
}

#[tokio::test]
async fn test_signup_flow() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "new-token",
            "user": { "id": 2, "email": "new@example.com", "name": "New User" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::open(config(&dir, &server)).unwrap();
    app.start().await;

    assert_eq!(app.open_signup(), ScreenOutcome::Navigated(Route::Signup));

    let fields = SignupFields::new("New User", "new@example.com", "secret1", "secret1");
    let outcome = app.signup(&fields).await;

    assert_eq!(outcome, ScreenOutcome::Navigated(Route::Home));
    assert_eq!(app.session().get_token().await, Some("new-token".to_string()));
}

#[tokio::test]
async fn test_expired_token_is_dropped_on_refresh() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;

    {
        let mut app = App::open(config(&dir, &server)).unwrap();
        app.start().await;
        app.login(&Credentials::new("a@b.com", "secret1")).await;

        let outcome = app.refresh_profile().await;
        assert_eq!(
            outcome,
            ScreenOutcome::alert("Error", "Failed to refresh profile. Please try again.")
        );
        assert!(!app.session().is_authenticated().await);
        assert_eq!(app.status(), AuthStatus::Unauthenticated);
    }

    // Next launch lands on Login
    let mut app = App::open(config(&dir, &server)).unwrap();
    assert_eq!(app.start().await, Some(Route::Login));
}

#[tokio::test]
async fn test_logout_clears_disk_even_if_server_fails() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    {
        let mut app = App::open(config(&dir, &server)).unwrap();
        app.start().await;
        app.login(&Credentials::new("a@b.com", "secret1")).await;

        let outcome = app.logout().await;
        assert_eq!(outcome, ScreenOutcome::Navigated(Route::Login));
        assert_eq!(app.navigation().depth(), 1);
        assert_eq!(app.status(), AuthStatus::Unauthenticated);
    }

    let mut app = App::open(config(&dir, &server)).unwrap();
    assert_eq!(app.start().await, Some(Route::Login));
    assert_eq!(app.session().get_profile().await, None);
}

#[tokio::test]
async fn test_server_down_shows_login_failed() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("kv.db").to_string_lossy().to_string();
    let config = AppConfig::new(db_path.clone())
        .storage(KvConfig::new(db_path).flush_every_ms(None))
        .api_base_url("http://127.0.0.1:1/api");

    let mut app = App::open(config).unwrap();
    app.start().await;

    let outcome = app.login(&Credentials::new("a@b.com", "secret1")).await;
    assert_eq!(outcome, ScreenOutcome::alert("Login Failed", "Login failed"));
    assert_eq!(app.current_route(), Route::Login);
}
