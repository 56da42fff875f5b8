//! Task domain model.
//!
//! # Responsibility
//! - Define the single to-do item shared by local lists and the remote feed.
//! - Enforce the non-blank text invariant on every construction path.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is trimmed and non-empty.
//! - Deserialization re-validates, so persisted data cannot smuggle in
//!   blank tasks.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for one task.
pub type TaskId = Uuid;

/// Validation errors for task construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task id must not be nil.
    NilId,
    /// Text is empty after trimming.
    BlankText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankText => write!(f, "task text must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, never blank.
    pub text: String,
    pub done: bool,
    /// Unix epoch milliseconds. Server-assigned for remote tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    id: TaskId,
    text: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    created_at: Option<i64>,
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = TaskWire::deserialize(deserializer)?;
        let mut task = Task::with_id(wire.id, wire.text).map_err(serde::de::Error::custom)?;
        task.done = wire.done;
        task.created_at = wire.created_at;
        Ok(task)
    }
}

impl Task {
    /// Creates an open task with a generated id and the current timestamp.
    ///
    /// # Errors
    /// - `BlankText` when `text` trims to empty.
    pub fn new(text: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        let mut task = Self::with_id(Uuid::new_v4(), text)?;
        task.created_at = Some(now_epoch_ms());
        Ok(task)
    }

    /// Creates an open task with a caller-provided id.
    ///
    /// Used by import and remote paths where identity already exists.
    pub fn with_id(id: TaskId, text: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        let text = normalize_text(text.as_ref()).ok_or(TaskValidationError::BlankText)?;
        Ok(Self {
            id,
            text,
            done: false,
            created_at: None,
        })
    }

    /// Flips completion and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.done = !self.done;
        self.done
    }
}

/// Trims user input and returns `None` when nothing is left.
pub fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, Task, TaskValidationError};
    use uuid::Uuid;

    #[test]
    fn new_trims_text_and_starts_open() {
        let task = Task::new("  Buy milk \n").expect("text should be accepted");
        assert_eq!(task.text, "Buy milk");
        assert!(!task.done);
        assert!(task.created_at.is_some());
        assert!(!task.id.is_nil());
    }

    #[test]
    fn new_rejects_blank_text() {
        assert_eq!(Task::new("").unwrap_err(), TaskValidationError::BlankText);
        assert_eq!(Task::new(" \t ").unwrap_err(), TaskValidationError::BlankText);
    }

    #[test]
    fn with_id_rejects_nil_id() {
        let err = Task::with_id(Uuid::nil(), "x").unwrap_err();
        assert_eq!(err, TaskValidationError::NilId);
    }

    #[test]
    fn toggle_flips_and_returns_new_value() {
        let mut task = Task::new("x").unwrap();
        assert!(task.toggle());
        assert!(!task.toggle());
    }

    #[test]
    fn normalize_text_returns_none_for_whitespace() {
        assert_eq!(normalize_text("   "), None);
        assert_eq!(normalize_text(" a "), Some("a".to_string()));
    }
}
