//! End-to-end session flows: app + client + vault against the mock API.

use crate::common::{
    app_against, mount_delete, mount_list, mount_login, mount_update, seed_token, settle,
    start_api_mock, vault_at,
};
use tarea_client::TokenSource;
use tarea_engine::{App, Notice, Screen, TaskId};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn type_login(app: &mut App, email: &str, password: &str) {
    let Screen::Login(form) = app.screen_mut() else {
        panic!("expected login screen");
    };
    for c in email.chars() {
        form.active_mut().insert_char(c);
    }
    form.focus_next();
    for c in password.chars() {
        form.active_mut().insert_char(c);
    }
}

fn type_draft(app: &mut App, text: &str) {
    let Screen::Tasks(board) = app.screen_mut() else {
        panic!("expected the task board");
    };
    for c in text.chars() {
        board.draft_mut().insert_char(c);
    }
}

fn tasks_len(app: &App) -> usize {
    match app.screen() {
        Screen::Tasks(board) => board.tasks().len(),
        Screen::Login(_) => panic!("expected the task board"),
    }
}

#[tokio::test]
async fn full_session_lifecycle() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "t-session").await;
    mount_list(
        &server,
        serde_json::json!([
            {"id": 1, "title": "Buy milk", "completed": false},
        ]),
    )
    .await;

    // Login lands on a loaded board.
    let mut app = app_against(&server, &dir);
    type_login(&mut app, "ana@example.com", "hunter2");
    app.submit_login();
    settle(&mut app).await;
    assert!(matches!(app.screen(), Screen::Tasks(_)));
    assert_eq!(tasks_len(&app), 1);
    assert_eq!(vault_at(&dir).current().unwrap().expose_secret(), "t-session");

    // Create uses the freshly stored bearer token.
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(header("authorization", "Bearer t-session"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 2, "title": "Walk the dog", "completed": false,
        })))
        .mount(&server)
        .await;
    type_draft(&mut app, "Walk the dog");
    app.submit_new_task();
    settle(&mut app).await;
    assert_eq!(tasks_len(&app), 2);

    // Toggle the first task.
    mount_update(
        &server,
        1,
        serde_json::json!({"id": 1, "title": "Buy milk", "completed": true}),
    )
    .await;
    app.toggle_selected();
    settle(&mut app).await;
    {
        let Screen::Tasks(board) = app.screen() else {
            panic!("expected the task board");
        };
        assert!(board.tasks()[0].completed);
        assert!(!board.tasks()[1].completed);
    }

    // Delete it.
    mount_delete(&server, 1).await;
    app.delete_selected();
    settle(&mut app).await;
    assert_eq!(tasks_len(&app), 1);
    {
        let Screen::Tasks(board) = app.screen() else {
            panic!("expected the task board");
        };
        assert_eq!(board.tasks()[0].id, TaskId::new(2));
    }

    // Logout drops the session entirely.
    app.logout();
    assert!(matches!(app.screen(), Screen::Login(_)));
    assert!(vault_at(&dir).current().is_none());
}

#[tokio::test]
async fn stale_token_is_rejected_and_cleared() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "stale");
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    settle(&mut app).await;

    assert!(matches!(app.screen(), Screen::Login(_)));
    assert!(vault_at(&dir).current().is_none());
    assert_eq!(app.notices().latest(), Some(Notice::FetchFailed));
}

#[tokio::test]
async fn relogin_after_rejection_uses_the_new_token() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "stale");
    // Reject the stale token's list, then accept a fresh login.
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_login(&server, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    settle(&mut app).await;
    assert!(matches!(app.screen(), Screen::Login(_)));

    type_login(&mut app, "ana@example.com", "hunter2");
    app.submit_login();
    settle(&mut app).await;

    assert!(matches!(app.screen(), Screen::Tasks(_)));
    assert_eq!(tasks_len(&app), 0);
    assert_eq!(vault_at(&dir).current().unwrap().expose_secret(), "fresh");
}
