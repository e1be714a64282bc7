//! Rendering tests: the real app drawn into a test backend.

use ratatui::{Terminal, backend::TestBackend};

use crate::common::{
    app_against, mount_create, mount_list, seed_token, settle, start_api_mock,
};
use tarea_engine::{App, Screen};
use tarea_tui::{EMPTY_MESSAGE, LOADING_MESSAGE, draw};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn rendered_text(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|frame| draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[tokio::test]
async fn board_shows_loading_until_the_list_arrives() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "t-1");
    mount_list(&server, serde_json::json!([])).await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    // The request is in flight and no completion has been applied yet.
    assert!(rendered_text(&app).contains(LOADING_MESSAGE));

    settle(&mut app).await;
    let text = rendered_text(&app);
    assert!(!text.contains(LOADING_MESSAGE));
    assert!(text.contains(EMPTY_MESSAGE));
    assert!(text.contains("Mis Tareas"));
}

#[tokio::test]
async fn tasks_render_with_their_completion_markers() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "t-1");
    mount_list(
        &server,
        serde_json::json!([
            {"id": 1, "title": "Buy milk", "completed": false},
            {"id": 2, "title": "Walk the dog", "completed": true},
        ]),
    )
    .await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    settle(&mut app).await;

    let text = rendered_text(&app);
    assert!(text.contains("Buy milk"));
    assert!(text.contains("Walk the dog"));
    assert!(text.contains('✓'));
    assert!(!text.contains(EMPTY_MESSAGE));
}

#[tokio::test]
async fn failed_create_renders_the_banner() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "t-1");
    mount_list(&server, serde_json::json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    settle(&mut app).await;
    {
        let Screen::Tasks(board) = app.screen_mut() else {
            panic!("expected the task board");
        };
        for c in "Nueva".chars() {
            board.draft_mut().insert_char(c);
        }
    }
    app.submit_new_task();
    settle(&mut app).await;

    let text = rendered_text(&app);
    assert!(text.contains("Error al crear la tarea."));
    // The draft is only cleared by a confirmed create.
    assert!(text.contains("Nueva"));
}

#[tokio::test]
async fn confirmed_create_clears_the_draft_and_lists_the_task() {
    let server = start_api_mock().await;
    let dir = tempfile::tempdir().unwrap();
    seed_token(&dir, "t-1");
    mount_list(&server, serde_json::json!([])).await;
    mount_create(
        &server,
        serde_json::json!({"id": 7, "title": "Nueva", "completed": false}),
    )
    .await;

    let mut app = app_against(&server, &dir);
    app.resume_session();
    settle(&mut app).await;
    {
        let Screen::Tasks(board) = app.screen_mut() else {
            panic!("expected the task board");
        };
        for c in "Nueva".chars() {
            board.draft_mut().insert_char(c);
        }
    }
    app.submit_new_task();
    settle(&mut app).await;

    let text = rendered_text(&app);
    assert!(text.contains("Nueva"));
    assert!(text.contains("Añadir nueva tarea...")); // placeholder back after clear
}
