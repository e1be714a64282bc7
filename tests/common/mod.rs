//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests: a mock task API plus an app
//! wired to it through a vault on a temp directory.

#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tarea_client::ApiClient;
use tarea_engine::{App, SessionToken, TokenVault, UiOptions};

/// Start a mock server that simulates the task API
pub async fn start_api_mock() -> MockServer {
    MockServer::start().await
}

/// Build an app whose client points at the mock server and whose vault lives
/// in the given temp directory.
pub fn app_against(server: &MockServer, dir: &TempDir) -> App {
    let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::new(base).unwrap();
    App::with_parts(client, TokenVault::new(dir.path()), UiOptions::default())
}

/// A second handle on the same vault directory, for asserting disk state.
pub fn vault_at(dir: &TempDir) -> TokenVault {
    TokenVault::new(dir.path())
}

/// Seed the vault with a token as a previous session would have left it.
pub fn seed_token(dir: &TempDir, token: &str) {
    vault_at(dir).store(&SessionToken::new(token)).unwrap();
}

/// Drain completions until the app has no operation in flight.
pub async fn settle(app: &mut App) {
    for _ in 0..400 {
        app.process_api_events();
        if app.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("operations did not settle");
}

/// Mount a successful login exchange minting the given token.
pub async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": token,
        })))
        .mount(server)
        .await;
}

/// Mount the list endpoint returning the given collection.
pub async fn mount_list(server: &MockServer, tasks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
        .mount(server)
        .await;
}

/// Mount the create endpoint returning the given record.
pub async fn mount_create(server: &MockServer, record: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(record))
        .mount(server)
        .await;
}

/// Mount the update endpoint for one id returning the given record.
pub async fn mount_update(server: &MockServer, id: i64, record: serde_json::Value) {
    Mock::given(method("PUT"))
        .and(path(format!("/api/tasks/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(record))
        .mount(server)
        .await;
}

/// Mount the delete endpoint for one id.
pub async fn mount_delete(server: &MockServer, id: i64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{id}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}
