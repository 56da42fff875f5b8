//! Display projections.
//!
//! # Responsibility
//! - Derive everything a front end shows from current state, on every call.
//! - Keep user-facing copy (empty-state messages, capacity indicator) in one
//!   place.
//!
//! # Invariants
//! - Rendering is pure; it never mutates or caches state.
//! - The list switcher never shows more than `MAX_LISTS` entries.

use crate::model::list::ListId;
use crate::model::registry::{ListRegistry, MAX_LISTS};
use crate::model::task::{Task, TaskId};
use crate::service::remote_session::{MutationKind, RemoteTodoSession};
use crate::sync::provider::RemoteTaskProvider;

pub const EMPTY_OPEN_MESSAGE: &str = "Keine offenen Todos. 🎉";
pub const EMPTY_DONE_MESSAGE: &str = "Noch nichts erledigt.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItemView {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
}

impl From<&Task> for TaskItemView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            done: task.done,
        }
    }
}

/// One task region (open or done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRegionView {
    pub items: Vec<TaskItemView>,
    /// Set only when `items` is empty.
    pub empty_message: Option<&'static str>,
}

impl TaskRegionView {
    fn new<'a>(tasks: impl Iterator<Item = &'a Task>, empty_message: &'static str) -> Self {
        let items: Vec<TaskItemView> = tasks.map(TaskItemView::from).collect();
        let empty_message = items.is_empty().then_some(empty_message);
        Self {
            items,
            empty_message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub open: usize,
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherEntryView {
    pub id: ListId,
    pub name: String,
    pub active: bool,
    pub task_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSwitcherView {
    pub entries: Vec<SwitcherEntryView>,
    /// `"<lists>/<max>"`.
    pub count_indicator: String,
    pub can_add_list: bool,
}

/// Projection of the local multi-list board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub header: String,
    pub switcher: ListSwitcherView,
    pub stats: TaskStats,
    pub open: TaskRegionView,
    pub done: TaskRegionView,
}

/// Projection of the remote feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub draft: String,
    pub stats: TaskStats,
    pub open: TaskRegionView,
    pub done: TaskRegionView,
    /// One line per failed mutation.
    pub notices: Vec<String>,
}

pub fn render_board(registry: &ListRegistry) -> BoardView {
    let active = registry.resolve_active();
    let entries: Vec<SwitcherEntryView> = registry
        .lists()
        .iter()
        .take(MAX_LISTS)
        .map(|list| SwitcherEntryView {
            id: list.id,
            name: list.name.clone(),
            active: list.id == active.id,
            task_count: list.todos.len(),
        })
        .collect();

    BoardView {
        header: active.name.clone(),
        switcher: ListSwitcherView {
            count_indicator: format!("{}/{}", entries.len(), MAX_LISTS),
            can_add_list: registry.remaining_capacity() > 0,
            entries,
        },
        stats: stats(active.todos.iter()),
        open: TaskRegionView::new(active.todos.iter().filter(|t| !t.done), EMPTY_OPEN_MESSAGE),
        done: TaskRegionView::new(active.todos.iter().filter(|t| t.done), EMPTY_DONE_MESSAGE),
    }
}

pub fn render_feed<P: RemoteTaskProvider + ?Sized>(session: &RemoteTodoSession<P>) -> FeedView {
    let tasks = session.tasks();
    let notices = session
        .failed_mutations()
        .into_iter()
        .map(|record| {
            let action = match &record.kind {
                MutationKind::Create { text } => format!("Konnte \"{text}\" nicht speichern"),
                MutationKind::SetDone { .. } => "Konnte Status nicht ändern".to_string(),
                MutationKind::Remove { .. } => "Konnte Aufgabe nicht löschen".to_string(),
            };
            format!("{action} (#{})", record.id)
        })
        .collect();

    FeedView {
        draft: session.draft().to_string(),
        stats: stats(tasks.iter()),
        open: TaskRegionView::new(tasks.iter().filter(|t| !t.done), EMPTY_OPEN_MESSAGE),
        done: TaskRegionView::new(tasks.iter().filter(|t| t.done), EMPTY_DONE_MESSAGE),
        notices,
    }
}

fn stats<'a>(tasks: impl Iterator<Item = &'a Task>) -> TaskStats {
    let (open, done) = tasks.fold((0, 0), |(open, done), task| {
        if task.done {
            (open, done + 1)
        } else {
            (open + 1, done)
        }
    });
    TaskStats {
        open,
        done,
        total: open + done,
    }
}

#[cfg(test)]
mod tests {
    use super::{render_board, EMPTY_DONE_MESSAGE, EMPTY_OPEN_MESSAGE};
    use crate::model::collection::OrderingPolicy;
    use crate::model::registry::{ListRegistry, DEFAULT_LIST_NAME};

    #[test]
    fn empty_board_shows_empty_messages() {
        let view = render_board(&ListRegistry::default());
        assert_eq!(view.header, DEFAULT_LIST_NAME);
        assert_eq!(view.open.empty_message, Some(EMPTY_OPEN_MESSAGE));
        assert_eq!(view.done.empty_message, Some(EMPTY_DONE_MESSAGE));
        assert_eq!(view.switcher.count_indicator, "1/5");
        assert!(view.switcher.can_add_list);
        assert_eq!(view.stats.total, 0);
    }

    #[test]
    fn board_splits_regions_and_marks_active_list() {
        let mut registry = ListRegistry::default();
        registry.add_list("Work").unwrap();
        let todos = &mut registry.resolve_active_mut().todos;
        let a = todos.add_task("a").unwrap();
        todos.add_task("b").unwrap();
        todos.toggle_task(a.id, OrderingPolicy::Stable);

        let view = render_board(&registry);
        assert_eq!(view.header, "Work");
        assert_eq!(view.open.items.len(), 1);
        assert_eq!(view.open.empty_message, None);
        assert_eq!(view.done.items[0].id, a.id);
        assert_eq!(view.stats.open, 1);
        assert_eq!(view.stats.done, 1);
        assert_eq!(view.switcher.count_indicator, "2/5");
        let active: Vec<_> = view.switcher.entries.iter().map(|e| e.active).collect();
        assert_eq!(active, vec![false, true]);
        assert_eq!(view.switcher.entries[1].task_count, 2);
    }

    #[test]
    fn full_registry_disables_list_creation() {
        let mut registry = ListRegistry::default();
        for n in 0..4 {
            registry.add_list(&format!("L{n}")).unwrap();
        }
        let view = render_board(&registry);
        assert_eq!(view.switcher.entries.len(), 5);
        assert_eq!(view.switcher.count_indicator, "5/5");
        assert!(!view.switcher.can_add_list);
    }
}
