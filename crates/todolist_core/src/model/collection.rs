//! Ordered task sequence of one list.
//!
//! # Responsibility
//! - Own insertion, toggle and removal of tasks by id.
//! - Derive open/done partitions on every read.
//!
//! # Invariants
//! - Newly added tasks are inserted at the front (newest first).
//! - Task ids are unique within a collection.
//! - Partitions are recomputed on each call and never cached.

use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Sequence policy applied after a toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Keep insertion order; open/done are filtered on read.
    #[default]
    Stable,
    /// Stable re-sort after every toggle so open tasks precede done tasks.
    OpenFirst,
}

impl OrderingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::OpenFirst => "open_first",
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "open_first" | "open-first" => Ok(Self::OpenFirst),
            other => Err(format!(
                "unsupported ordering `{other}`; expected stable|open_first"
            )),
        }
    }
}

/// Rejected task sequence: the same id appears more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateTaskId(pub TaskId);

impl Display for DuplicateTaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate task id `{}`", self.0)
    }
}

impl Error for DuplicateTaskId {}

/// Ordered tasks of one list. Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TryFrom<Vec<Task>> for TaskCollection {
    type Error = DuplicateTaskId;

    /// Builds a collection from existing tasks, keeping their order.
    ///
    /// # Errors
    /// - `DuplicateTaskId` for the first id seen twice.
    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(tasks.len());
        if let Some(task) = tasks.iter().find(|task| !seen.insert(task.id)) {
            return Err(DuplicateTaskId(task.id));
        }
        Ok(Self { tasks })
    }
}

impl From<TaskCollection> for Vec<Task> {
    fn from(collection: TaskCollection) -> Self {
        collection.tasks
    }
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a task from `text` and inserts it at the front.
    ///
    /// Returns `None` without changing anything when `text` is blank.
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let task = Task::new(text).ok()?;
        self.tasks.insert(0, task.clone());
        Some(task)
    }

    /// Flips `done` for the matching task and returns the new value.
    pub fn toggle_task(&mut self, id: TaskId, policy: OrderingPolicy) -> Option<bool> {
        let done = self.tasks.iter_mut().find(|task| task.id == id)?.toggle();
        if policy == OrderingPolicy::OpenFirst {
            // `sort_by_key` is stable, so relative order inside each partition survives.
            self.tasks.sort_by_key(|task| task.done);
        }
        Some(done)
    }

    /// Removes the matching task and returns it.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn open_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| !task.done).collect()
    }

    pub fn done_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.done).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DuplicateTaskId, OrderingPolicy, TaskCollection};
    use crate::model::task::Task;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn add_task_inserts_newest_first() {
        let mut tasks = TaskCollection::new();
        let first = tasks.add_task("first").unwrap();
        let second = tasks.add_task("second").unwrap();

        let ids: Vec<_> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn add_task_ignores_blank_text() {
        let mut tasks = TaskCollection::new();
        assert!(tasks.add_task("").is_none());
        assert!(tasks.add_task("   ").is_none());
        assert!(tasks.is_empty());
    }

    #[test]
    fn toggle_twice_restores_flag_and_leaves_others_untouched() {
        let mut tasks = TaskCollection::new();
        let a = tasks.add_task("a").unwrap();
        let b = tasks.add_task("b").unwrap();
        tasks.toggle_task(b.id, OrderingPolicy::Stable);
        let before = tasks.clone();

        assert_eq!(tasks.toggle_task(a.id, OrderingPolicy::Stable), Some(true));
        assert_eq!(tasks.toggle_task(a.id, OrderingPolicy::Stable), Some(false));
        assert_eq!(tasks, before);
    }

    #[test]
    fn toggle_and_remove_unknown_id_are_noops() {
        let mut tasks = TaskCollection::new();
        tasks.add_task("a").unwrap();
        let before = tasks.clone();

        assert_eq!(tasks.toggle_task(Uuid::new_v4(), OrderingPolicy::Stable), None);
        assert!(tasks.remove_task(Uuid::new_v4()).is_none());
        assert_eq!(tasks, before);
    }

    #[test]
    fn remove_then_toggle_is_noop() {
        let mut tasks = TaskCollection::new();
        let a = tasks.add_task("a").unwrap();
        assert_eq!(tasks.remove_task(a.id).map(|task| task.id), Some(a.id));
        assert_eq!(tasks.toggle_task(a.id, OrderingPolicy::Stable), None);
        assert!(tasks.is_empty());
    }

    #[test]
    fn stable_policy_keeps_insertion_order_after_toggle() {
        let mut tasks = TaskCollection::new();
        let a = tasks.add_task("a").unwrap();
        let b = tasks.add_task("b").unwrap();
        let c = tasks.add_task("c").unwrap();

        tasks.toggle_task(c.id, OrderingPolicy::Stable);
        let ids: Vec<_> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn open_first_policy_moves_done_tasks_behind_open_ones() {
        let mut tasks = TaskCollection::new();
        let a = tasks.add_task("a").unwrap();
        let b = tasks.add_task("b").unwrap();
        let c = tasks.add_task("c").unwrap();

        tasks.toggle_task(c.id, OrderingPolicy::OpenFirst);
        let ids: Vec<_> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);
        assert!(tasks.get(c.id).unwrap().done);
        assert_eq!(tasks.get(c.id).unwrap().text, "c");
    }

    #[test]
    fn partitions_cover_collection_and_are_disjoint() {
        let mut tasks = TaskCollection::new();
        let ids: Vec<_> = (0..6)
            .map(|n| tasks.add_task(&format!("task {n}")).unwrap().id)
            .collect();
        tasks.toggle_task(ids[1], OrderingPolicy::Stable);
        tasks.toggle_task(ids[4], OrderingPolicy::OpenFirst);
        tasks.remove_task(ids[2]);

        let open: HashSet<_> = tasks.open_tasks().iter().map(|task| task.id).collect();
        let done: HashSet<_> = tasks.done_tasks().iter().map(|task| task.id).collect();
        let all: HashSet<_> = tasks.iter().map(|task| task.id).collect();

        assert!(open.is_disjoint(&done));
        assert_eq!(open.union(&done).copied().collect::<HashSet<_>>(), all);
        assert_eq!(done.len(), 2);
    }

    #[test]
    fn try_from_rejects_duplicate_ids() {
        let task = Task::new("dup").unwrap();
        let err = TaskCollection::try_from(vec![task.clone(), task.clone()]).unwrap_err();
        assert_eq!(err, DuplicateTaskId(task.id));
    }

    #[test]
    fn deserialize_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "11111111-1111-4111-8111-111111111111", "text": "a", "done": false},
            {"id": "11111111-1111-4111-8111-111111111111", "text": "b", "done": true}
        ]"#;
        let err = serde_json::from_str::<TaskCollection>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate task id"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut tasks = TaskCollection::new();
        tasks.add_task("a").unwrap();
        let json = serde_json::to_value(&tasks).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(serde_json::from_value::<TaskCollection>(json).unwrap(), tasks);
    }

    #[test]
    fn ordering_policy_parses_known_values() {
        assert_eq!(
            " Open_First ".parse::<OrderingPolicy>().unwrap(),
            OrderingPolicy::OpenFirst
        );
        assert_eq!("stable".parse::<OrderingPolicy>().unwrap(), OrderingPolicy::Stable);
        assert!("sorted".parse::<OrderingPolicy>().is_err());
    }
}
