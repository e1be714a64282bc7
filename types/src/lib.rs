//! Core domain types for Tarea.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod session;
pub use session::{Credentials, LoginResponse, SessionToken};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Task Record
// ============================================================================

/// Server-assigned task identifier.
///
/// Ids are minted by the remote API on creation; the client never invents one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task record as the server represents it.
///
/// The local task sequence mirrors the server's collection; records are only
/// ever replaced wholesale with the server's last returned representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

// ============================================================================
// Task Title
// ============================================================================

/// A trimmed, guaranteed non-empty task title.
///
/// Creation is the only place the client validates a title; building one from
/// whitespace fails, which callers treat as "skip the request entirely".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct TaskTitle(String);

#[derive(Debug, Error)]
#[error("task title must not be empty")]
pub struct EmptyTitleError;

impl TaskTitle {
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmptyTitleError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Err(EmptyTitleError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TaskTitle> for String {
    fn from(value: TaskTitle) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Body of a create request: `{"title": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: TaskTitle,
}

impl NewTask {
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self { title }
    }
}

/// Body of an update request: `{"completed": ...}`.
///
/// The update endpoint only ever flips the completion flag; the title is not
/// editable after creation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskPatch {
    pub completed: bool,
}
