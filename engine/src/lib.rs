//! Core engine for Tarea - state machine and orchestration.
//!
//! This crate contains the [`App`] state machine without TUI dependencies.
//!
//! # Architecture
//!
//! The app owns two screens (login and task board) and mirrors the remote
//! task collection on the board. Every remote operation is spawned onto the
//! tokio runtime and reports back through an unbounded mpsc channel; the
//! render loop drains completions with [`App::process_api_events`].
//!
//! Several operations may be in flight at once (two quick toggles, a create
//! racing a delete). Completions apply strictly in arrival order and the last
//! arrival wins whatever state it touches - nothing reorders, dedups, or
//! cancels. A request that never resolves simply never completes.
//!
//! # Session lifecycle
//!
//! The bearer token lives in the on-disk [`TokenVault`] and is re-read for
//! every request. Login fills the vault; logout empties it; a rejected list
//! request (HTTP 401, or a missing token) empties it and drops the app back
//! onto the login screen, discarding the board wholesale.

mod config;
mod draft;
mod notices;
mod session;


pub use config::{
    ApiConfig, AppConfig, ConfigError, TareaConfig, UiOptions, config_path, session_dir,
};
pub use draft::DraftField;
pub use notices::{Notice, NoticeQueue};
pub use session::TokenVault;

pub use tarea_client::{ApiClient, ApiError, DEFAULT_BASE_URL, TokenSource};
pub use tarea_types::{Credentials, SessionToken, Task, TaskId, TaskPatch, TaskTitle};

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

// ============================================================================
// Screens
// ============================================================================

/// Which login field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// State of the login screen.
#[derive(Debug, Default)]
pub struct LoginForm {
    email: DraftField,
    password: DraftField,
    focus: LoginField,
    submitting: bool,
}

impl LoginForm {
    #[must_use]
    pub fn email(&self) -> &DraftField {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &DraftField {
        &self.password
    }

    #[must_use]
    pub fn focus(&self) -> LoginField {
        self.focus
    }

    /// True while a login exchange is in flight; further submits are ignored.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The field currently receiving keystrokes.
    pub fn active_mut(&mut self) -> &mut DraftField {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }
}

/// State of the task board: the mirrored collection plus the creation draft.
///
/// A board is built fresh every time the screen is entered; nothing survives
/// a trip through the login screen.
#[derive(Debug)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    loading: bool,
    draft: DraftField,
    selected: usize,
}

impl TaskBoard {
    fn new() -> Self {
        Self {
            tasks: Vec::new(),
            loading: true,
            draft: DraftField::default(),
            selected: 0,
        }
    }

    /// The mirrored task sequence, in server order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True until the initial list response (success or failure) arrives.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn draft(&self) -> &DraftField {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftField {
        &mut self.draft
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if !self.tasks.is_empty() {
            self.selected = (self.selected + 1).min(self.tasks.len() - 1);
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
    }
}

/// The two client-side routes.
#[derive(Debug)]
pub enum Screen {
    Login(LoginForm),
    Tasks(TaskBoard),
}

// ============================================================================
// Operation outcomes
// ============================================================================

/// Completion of a spawned remote operation.
///
/// Each variant carries exactly what the apply step needs; errors stay typed
/// so the 401 path can be told apart from generic failures.
#[derive(Debug)]
enum OpOutcome {
    SignedIn(Result<SessionToken, ApiError>),
    Loaded(Result<Vec<Task>, ApiError>),
    Created(Result<Task, ApiError>),
    Updated(Result<Task, ApiError>),
    Deleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
}

// ============================================================================
// App
// ============================================================================

/// Application state machine.
pub struct App {
    client: ApiClient,
    vault: Arc<TokenVault>,
    screen: Screen,
    notices: NoticeQueue,
    options: UiOptions,
    outcomes_tx: mpsc::UnboundedSender<OpOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<OpOutcome>,
    in_flight: usize,
}

impl App {
    /// Build the app from loaded configuration, with the vault at its
    /// default location under the home directory.
    pub fn new(config: &TareaConfig) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.base_url())?;
        let session_dir = session_dir().context("could not determine home directory")?;
        Ok(Self::with_parts(
            client,
            TokenVault::new(session_dir),
            config.ui_options(),
        ))
    }

    /// Build the app from explicit parts. Starts on the login screen.
    #[must_use]
    pub fn with_parts(client: ApiClient, vault: TokenVault, options: UiOptions) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            client,
            vault: Arc::new(vault),
            screen: Screen::Login(LoginForm::default()),
            notices: NoticeQueue::new(),
            options,
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
        }
    }

    /// Skip the login screen when a token is already stored from a previous
    /// session. The server still has the last word: a stale token fails the
    /// initial list with 401 and lands back on login.
    pub fn resume_session(&mut self) {
        if self.vault.current().is_some() {
            self.enter_tasks();
        }
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.options
    }

    /// Number of remote operations dispatched but not yet applied.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Exchange the form's credentials for a session token.
    pub fn submit_login(&mut self) {
        let Screen::Login(form) = &mut self.screen else {
            return;
        };
        if form.submitting {
            return;
        }
        form.submitting = true;
        let credentials = Credentials::new(form.email.text().trim(), form.password.text());
        let client = self.client.clone();
        self.spawn_op(async move { OpOutcome::SignedIn(client.login(&credentials).await) });
    }

    /// Fetch the task collection, replacing the board's sequence wholesale on
    /// success. Dispatched automatically when the board is entered.
    pub fn load_tasks(&mut self) {
        let Screen::Tasks(board) = &mut self.screen else {
            return;
        };
        board.loading = true;
        let client = self.client.clone();
        let vault = Arc::clone(&self.vault);
        self.spawn_op(async move { OpOutcome::Loaded(client.list_tasks(vault.as_ref()).await) });
    }

    /// Create a task from the board's draft. A whitespace-only draft performs
    /// no request and no state change; the draft is cleared only once the
    /// server confirms.
    pub fn submit_new_task(&mut self) {
        let Screen::Tasks(board) = &self.screen else {
            return;
        };
        let Ok(title) = TaskTitle::new(board.draft.text()) else {
            return;
        };
        let client = self.client.clone();
        let vault = Arc::clone(&self.vault);
        self.spawn_op(async move {
            OpOutcome::Created(client.create_task(vault.as_ref(), title).await)
        });
    }

    /// Flip the completion flag of the selected task.
    pub fn toggle_selected(&mut self) {
        let Screen::Tasks(board) = &self.screen else {
            return;
        };
        let Some(task) = board.selected_task() else {
            return;
        };
        let id = task.id;
        let patch = TaskPatch {
            completed: !task.completed,
        };
        let client = self.client.clone();
        let vault = Arc::clone(&self.vault);
        self.spawn_op(async move {
            OpOutcome::Updated(client.update_task(vault.as_ref(), id, patch).await)
        });
    }

    /// Delete the selected task.
    pub fn delete_selected(&mut self) {
        let Screen::Tasks(board) = &self.screen else {
            return;
        };
        let Some(task) = board.selected_task() else {
            return;
        };
        let id = task.id;
        let client = self.client.clone();
        let vault = Arc::clone(&self.vault);
        self.spawn_op(async move {
            OpOutcome::Deleted {
                id,
                result: client.delete_task(vault.as_ref(), id).await,
            }
        });
    }

    /// Clear the vault and return to the login screen. No server call.
    pub fn logout(&mut self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!(%e, "failed to clear session token");
        }
        self.notices.clear();
        self.screen = Screen::Login(LoginForm::default());
    }

    // ------------------------------------------------------------------
    // Completion handling
    // ------------------------------------------------------------------

    /// Drain and apply all completed operations. Called once per frame.
    pub fn process_api_events(&mut self) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    fn spawn_op<F>(&mut self, op: F)
    where
        F: Future<Output = OpOutcome> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away when the app does.
            let _ = tx.send(op.await);
        });
    }

    /// Apply one completion in arrival order.
    ///
    /// Outcomes for a board that has since been discarded (logout, session
    /// invalidation) are dropped on the floor, matching the way a full page
    /// navigation discards in-memory state.
    fn apply_outcome(&mut self, outcome: OpOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            OpOutcome::SignedIn(Ok(token)) => {
                if let Err(e) = self.vault.store(&token) {
                    tracing::warn!(%e, "failed to persist session token");
                    self.notices.push(Notice::LoginFailed);
                    if let Screen::Login(form) = &mut self.screen {
                        form.submitting = false;
                    }
                    return;
                }
                self.notices.clear();
                self.enter_tasks();
            }
            OpOutcome::SignedIn(Err(e)) => {
                tracing::warn!(%e, "login failed");
                self.notices.push(Notice::LoginFailed);
                if let Screen::Login(form) = &mut self.screen {
                    form.submitting = false;
                }
            }
            OpOutcome::Loaded(Ok(tasks)) => {
                if let Screen::Tasks(board) = &mut self.screen {
                    board.tasks = tasks;
                    board.loading = false;
                    board.clamp_selection();
                }
            }
            OpOutcome::Loaded(Err(e)) => {
                tracing::warn!(%e, "list failed");
                self.notices.push(Notice::FetchFailed);
                if let Screen::Tasks(board) = &mut self.screen {
                    board.loading = false;
                }
                if e.invalidates_session() {
                    self.invalidate_session();
                }
            }
            OpOutcome::Created(Ok(task)) => {
                if let Screen::Tasks(board) = &mut self.screen {
                    board.tasks.push(task);
                    board.draft.clear();
                }
            }
            OpOutcome::Created(Err(e)) => {
                tracing::warn!(%e, "create failed");
                self.notices.push(Notice::CreateFailed);
            }
            OpOutcome::Updated(Ok(task)) => {
                if let Screen::Tasks(board) = &mut self.screen
                    && let Some(slot) = board.tasks.iter_mut().find(|t| t.id == task.id)
                {
                    *slot = task;
                }
            }
            OpOutcome::Updated(Err(e)) => {
                tracing::warn!(%e, "update failed");
                self.notices.push(Notice::UpdateFailed);
            }
            OpOutcome::Deleted { id, result: Ok(()) } => {
                if let Screen::Tasks(board) = &mut self.screen {
                    board.tasks.retain(|t| t.id != id);
                    board.clamp_selection();
                }
            }
            OpOutcome::Deleted { result: Err(e), .. } => {
                tracing::warn!(%e, "delete failed");
                self.notices.push(Notice::DeleteFailed);
            }
        }
    }

    fn enter_tasks(&mut self) {
        self.screen = Screen::Tasks(TaskBoard::new());
        self.load_tasks();
    }

    /// The server rejected the session: clear the stored token and drop back
    /// to a fresh login screen. Notices survive so the failure stays visible.
    fn invalidate_session(&mut self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!(%e, "failed to clear rejected session token");
        }
        self.screen = Screen::Login(LoginForm::default());
    }
}
