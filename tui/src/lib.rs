//! TUI rendering for Tarea using ratatui.
//!
//! The engine owns all state; this crate turns an [`App`] into frames and
//! feeds key events back into it. Layout mirrors the two screens: a centered
//! login form, and the task board with a fixed banner line, the creation
//! input, and the mirrored task list.

mod input;
mod theme;

pub use input::handle_events;
pub use theme::{Glyphs, Palette, glyphs, palette};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use tarea_engine::{App, DraftField, LoginField, LoginForm, Screen, TaskBoard};

/// Shown while the initial list request is in flight.
pub const LOADING_MESSAGE: &str = "Cargando tareas...";
/// Shown when the remote collection is empty.
pub const EMPTY_MESSAGE: &str = "No hay tareas para mostrar.";

const LOGIN_TITLE: &str = "Iniciar Sesión";
const EMAIL_LABEL: &str = "Correo electrónico";
const PASSWORD_LABEL: &str = "Contraseña";
const BOARD_TITLE: &str = "Mis Tareas";
const LOGOUT_HINT: &str = "Ctrl-L: Cerrar Sesión";
const DRAFT_PLACEHOLDER: &str = "Añadir nueva tarea...";

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    match app.screen() {
        Screen::Login(form) => draw_login(frame, app, form, &palette, &glyphs),
        Screen::Tasks(board) => draw_tasks(frame, app, board, &palette, &glyphs),
    }
}

fn draw_login(frame: &mut Frame, app: &App, form: &LoginForm, palette: &Palette, glyphs: &Glyphs) {
    let area = centered_rect(frame.area(), 46, 12);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel))
        .title(Span::styled(
            format!(" {LOGIN_TITLE} "),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(1), // Banner
            Constraint::Length(1), // Hint
        ])
        .split(inner);

    let masked: String = std::iter::repeat_n(glyphs.mask, form.password().grapheme_len()).collect();
    draw_field(
        frame,
        rows[0],
        EMAIL_LABEL,
        form.email().text(),
        form.focus() == LoginField::Email,
        palette,
    );
    draw_field(
        frame,
        rows[1],
        PASSWORD_LABEL,
        &masked,
        form.focus() == LoginField::Password,
        palette,
    );

    // Cursor in the focused field
    let (field_area, column) = match form.focus() {
        LoginField::Email => (rows[0], width_before_cursor(form.email())),
        LoginField::Password => (rows[1], form.password().cursor() as u16),
    };
    frame.set_cursor_position(Position::new(field_area.x + 1 + column, field_area.y + 1));

    draw_banner(frame, app, rows[2], palette);

    let hint = if form.is_submitting() {
        Line::styled("Iniciando sesión...", Style::default().fg(palette.warning))
    } else {
        Line::styled(
            format!("Enter: entrar{}Tab: cambiar campo", glyphs.separator),
            Style::default().fg(palette.text_muted),
        )
    };
    frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), rows[3]);
}

fn draw_tasks(frame: &mut Frame, app: &App, board: &TaskBoard, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Banner
            Constraint::Length(3), // Creation input
            Constraint::Min(1),    // Task list
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], palette);
    draw_banner(frame, app, chunks[1], palette);
    draw_draft(frame, board, chunks[2], palette);
    draw_task_list(frame, board, chunks[3], palette, glyphs);
    draw_status_bar(frame, chunks[4], palette, glyphs);
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            BOARD_TITLE,
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        )),
        area,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            LOGOUT_HINT,
            Style::default().fg(palette.text_muted),
        ))
        .alignment(Alignment::Right),
        area,
    );
}

/// The banner keeps a fixed line whether or not a notice is pending.
fn draw_banner(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let Some(notice) = app.notices().latest() else {
        return;
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            notice.message(),
            Style::default().fg(palette.error),
        ))
        .alignment(Alignment::Center),
        area,
    );
}

fn draw_draft(frame: &mut Frame, board: &TaskBoard, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let draft = board.draft();
    let content = if draft.is_empty() {
        Span::styled(DRAFT_PLACEHOLDER, Style::default().fg(palette.text_muted))
    } else {
        Span::styled(
            sanitize(draft.text()),
            Style::default().fg(palette.text_primary),
        )
    };
    frame.render_widget(Paragraph::new(content), inner);
    frame.set_cursor_position(Position::new(inner.x + width_before_cursor(draft), inner.y));
}

fn draw_task_list(
    frame: &mut Frame,
    board: &TaskBoard,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if board.is_loading() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                LOADING_MESSAGE,
                Style::default().fg(palette.text_muted),
            ))
            .alignment(Alignment::Center),
            area,
        );
        return;
    }
    if board.tasks().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                EMPTY_MESSAGE,
                Style::default().fg(palette.text_muted),
            )),
            area,
        );
        return;
    }

    let mut lines = Vec::with_capacity(board.tasks().len());
    for (index, task) in board.tasks().iter().enumerate() {
        let selected = index == board.selected();
        let (marker, marker_style) = if task.completed {
            (glyphs.task_done, Style::default().fg(palette.success))
        } else {
            (glyphs.task_pending, Style::default().fg(palette.text_muted))
        };
        let title_style = if task.completed {
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(palette.text_primary)
        };
        let pointer = if selected { glyphs.pointer } else { " " };

        let mut line = Line::from(vec![
            Span::styled(format!("{pointer} "), Style::default().fg(palette.accent)),
            Span::styled(format!("{marker} "), marker_style),
            Span::styled(sanitize(&task.title), title_style),
        ]);
        if selected {
            line = line.style(Style::default().bg(palette.bg_highlight));
        }
        lines.push(line);
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let sep = glyphs.separator;
    let hints = format!(
        "Enter: añadir{sep}Ctrl-T: completar{sep}Ctrl-D: eliminar{sep}Ctrl-R: recargar{sep}Ctrl-C: salir"
    );
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(palette.text_muted))),
        area,
    );
}

fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    palette: &Palette,
) {
    let border = if focused {
        palette.accent
    } else {
        palette.bg_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {label} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            sanitize(value),
            Style::default().fg(palette.text_primary),
        )),
        inner,
    );
}

/// Terminal column of the cursor within a draft's rendered text.
fn width_before_cursor(draft: &DraftField) -> u16 {
    let before: String = draft.text().graphemes(true).take(draft.cursor()).collect();
    before.width() as u16
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Strip control characters so server-provided titles cannot corrupt the
/// terminal.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}
