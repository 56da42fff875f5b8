//! Named task list.

use crate::model::collection::TaskCollection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one list.
pub type ListId = Uuid;

/// A named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub todos: TaskCollection,
}

impl TodoList {
    /// Creates an empty list with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            todos: TaskCollection::new(),
        }
    }
}
