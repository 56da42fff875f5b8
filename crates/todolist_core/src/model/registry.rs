//! List registry: the full application state.
//!
//! # Responsibility
//! - Own the set of named lists and the active list pointer.
//! - Enforce the `MAX_LISTS` capacity on list creation.
//!
//! # Invariants
//! - `lists` is never empty and never longer than `MAX_LISTS`.
//! - List ids are unique.
//! - `active_list_id` resolves to a member of `lists`; a stale pointer falls
//!   back to the first list.
//!
//! # See also
//! - `store::state_store` for the persisted shape.

use crate::model::list::{ListId, TodoList};
use crate::model::task::normalize_text;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Upper bound on the number of lists in one registry.
pub const MAX_LISTS: usize = 5;

/// Name of the list created when no prior state exists.
pub const DEFAULT_LIST_NAME: &str = "Meine Todos";

/// Fixed id of the default list so that a fresh load is deterministic.
pub const DEFAULT_LIST_ID: ListId = Uuid::from_u128(0x6d65_696e_6504_4000_8000_746f_646f_7301);

/// Rejection reasons for `ListRegistry::add_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddListError {
    /// Registry already holds `max` lists.
    CapacityReached { max: usize },
    /// Name is empty after trimming.
    BlankName,
}

impl Display for AddListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityReached { max } => write!(f, "list capacity reached ({max})"),
            Self::BlankName => write!(f, "list name must not be blank"),
        }
    }
}

impl Error for AddListError {}

/// Structural problems found when rebuilding a registry from stored parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryShapeError {
    NoLists,
    DuplicateListId(ListId),
}

impl Display for RegistryShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLists => write!(f, "registry must contain at least one list"),
            Self::DuplicateListId(id) => write!(f, "duplicate list id: {id}"),
        }
    }
}

impl Error for RegistryShapeError {}

/// Wire shape of a persisted registry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrySnapshot {
    lists: Vec<TodoList>,
    #[serde(default)]
    active_list_id: Option<ListId>,
}

impl TryFrom<RegistrySnapshot> for ListRegistry {
    type Error = RegistryShapeError;

    fn try_from(value: RegistrySnapshot) -> Result<Self, Self::Error> {
        Self::from_parts(value.lists, value.active_list_id)
    }
}

/// Owns all lists plus the active list pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RegistrySnapshot")]
pub struct ListRegistry {
    lists: Vec<TodoList>,
    active_list_id: ListId,
}

impl Default for ListRegistry {
    /// One empty list named `DEFAULT_LIST_NAME`, active.
    fn default() -> Self {
        Self::with_list(TodoList::with_id(DEFAULT_LIST_ID, DEFAULT_LIST_NAME))
    }
}

impl ListRegistry {
    /// Creates a registry holding exactly `list`, which becomes active.
    pub fn with_list(list: TodoList) -> Self {
        Self {
            active_list_id: list.id,
            lists: vec![list],
        }
    }

    /// Rebuilds a registry from stored parts.
    ///
    /// Lists past `MAX_LISTS` are dropped and a stale or missing active id is
    /// repaired to the first list.
    ///
    /// # Errors
    /// - `NoLists` when `lists` is empty.
    /// - `DuplicateListId` when two lists share an id.
    pub fn from_parts(
        mut lists: Vec<TodoList>,
        active_list_id: Option<ListId>,
    ) -> Result<Self, RegistryShapeError> {
        let mut seen = HashSet::with_capacity(lists.len());
        for list in &lists {
            if !seen.insert(list.id) {
                return Err(RegistryShapeError::DuplicateListId(list.id));
            }
        }
        if lists.len() > MAX_LISTS {
            warn!(
                "event=registry_truncate module=model status=degraded lists={} max={}",
                lists.len(),
                MAX_LISTS
            );
            lists.truncate(MAX_LISTS);
        }
        let first_id = lists.first().ok_or(RegistryShapeError::NoLists)?.id;
        let active_list_id = match active_list_id {
            Some(id) if lists.iter().any(|list| list.id == id) => id,
            _ => first_id,
        };
        Ok(Self {
            lists,
            active_list_id,
        })
    }

    /// Appends a new empty list and makes it active.
    pub fn add_list(&mut self, name: &str) -> Result<&TodoList, AddListError> {
        if self.lists.len() >= MAX_LISTS {
            return Err(AddListError::CapacityReached { max: MAX_LISTS });
        }
        let name = normalize_text(name).ok_or(AddListError::BlankName)?;
        let list = TodoList::new(name);
        self.active_list_id = list.id;
        self.lists.push(list);
        Ok(self.resolve_active())
    }

    /// Points the registry at list `id`.
    ///
    /// Returns `false` without changes when `id` is already active or unknown.
    pub fn switch_active(&mut self, id: ListId) -> bool {
        if self.active_list_id == id || !self.contains(id) {
            return false;
        }
        self.active_list_id = id;
        true
    }

    /// Returns the active list, falling back to the first list.
    pub fn resolve_active(&self) -> &TodoList {
        let index = self.active_index();
        &self.lists[index]
    }

    /// Mutable access to the active list.
    pub fn resolve_active_mut(&mut self) -> &mut TodoList {
        let index = self.active_index();
        &mut self.lists[index]
    }

    pub fn active_list_id(&self) -> ListId {
        self.resolve_active().id
    }

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_LISTS.saturating_sub(self.lists.len())
    }

    pub fn contains(&self, id: ListId) -> bool {
        self.lists.iter().any(|list| list.id == id)
    }

    fn active_index(&self) -> usize {
        // `lists` is non-empty by construction, so index 0 is always valid.
        self.lists
            .iter()
            .position(|list| list.id == self.active_list_id)
            .unwrap_or(0)
    }
}
