//! Input handling for the Tarea TUI.
//!
//! Translates crossterm key events into engine calls. The queue is drained
//! non-blocking once per frame so rendering is never starved by input.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tarea_engine::{App, Screen};

const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// Drain pending input events and apply them to the app.
///
/// Returns `true` when the user asked to quit.
pub fn handle_events(app: &mut App) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        if !event::poll(Duration::ZERO)? {
            break;
        }
        if let Event::Key(key) = event::read()?
            && key.kind != KeyEventKind::Release
            && handle_key(app, key)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if key.code == KeyCode::Esc {
        app.dismiss_notices();
        return false;
    }

    match app.screen() {
        Screen::Login(_) => handle_login_key(app, key),
        Screen::Tasks(_) => handle_tasks_key(app, key),
    }
    false
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_login();
        return;
    }

    let Screen::Login(form) = app.screen_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.focus_next(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.active_mut().insert_char(c);
        }
        KeyCode::Backspace => form.active_mut().backspace(),
        KeyCode::Left => form.active_mut().move_cursor_left(),
        KeyCode::Right => form.active_mut().move_cursor_right(),
        KeyCode::Home => form.active_mut().move_cursor_home(),
        KeyCode::End => form.active_mut().move_cursor_end(),
        _ => {}
    }
}

fn handle_tasks_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('l') => app.logout(),
            KeyCode::Char('t') => app.toggle_selected(),
            KeyCode::Char('d') => app.delete_selected(),
            KeyCode::Char('r') => app.load_tasks(),
            _ => {}
        }
        return;
    }
    if key.code == KeyCode::Enter {
        app.submit_new_task();
        return;
    }
    if key.code == KeyCode::Delete {
        app.delete_selected();
        return;
    }

    let Screen::Tasks(board) = app.screen_mut() else {
        return;
    };
    match key.code {
        KeyCode::Up => board.select_prev(),
        KeyCode::Down => board.select_next(),
        KeyCode::Char(c) => board.draft_mut().insert_char(c),
        KeyCode::Backspace => board.draft_mut().backspace(),
        KeyCode::Left => board.draft_mut().move_cursor_left(),
        KeyCode::Right => board.draft_mut().move_cursor_right(),
        KeyCode::Home => board.draft_mut().move_cursor_home(),
        KeyCode::End => board.draft_mut().move_cursor_end(),
        _ => {}
    }
}
