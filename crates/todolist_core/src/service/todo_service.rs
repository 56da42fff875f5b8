//! Local to-do use-case service.
//!
//! # Responsibility
//! - Own the canonical `ListRegistry` for one session.
//! - Apply task and list operations to the active list.
//! - Save the full registry once after every state-changing operation.
//!
//! # Invariants
//! - Rejected input (blank text, unknown id, full registry, same list)
//!   leaves state untouched and triggers no save.
//! - A failed save never rolls back or corrupts in-memory state.

use crate::model::collection::OrderingPolicy;
use crate::model::list::{ListId, TodoList};
use crate::model::registry::{AddListError, ListRegistry};
use crate::model::task::{Task, TaskId};
use crate::store::state_store::StateStore;
use crate::store::StateSlot;
use crate::view::{render_board, BoardView};
use log::{debug, info};

/// Session-scoped state container with save-through persistence.
pub struct TodoService<S: StateSlot> {
    store: StateStore<S>,
    registry: ListRegistry,
    ordering: OrderingPolicy,
    save_count: u64,
}

impl<S: StateSlot> TodoService<S> {
    /// Loads the registry from `store` (or its default) and starts a session.
    pub fn open(store: StateStore<S>, ordering: OrderingPolicy) -> Self {
        let registry = store.load();
        info!(
            "event=session_open module=service status=ok key={} lists={} ordering={}",
            store.key(),
            registry.list_count(),
            ordering.as_str()
        );
        Self {
            store,
            registry,
            ordering,
            save_count: 0,
        }
    }

    pub fn registry(&self) -> &ListRegistry {
        &self.registry
    }

    pub fn active_list(&self) -> &TodoList {
        self.registry.resolve_active()
    }

    pub fn open_tasks(&self) -> Vec<&Task> {
        self.active_list().todos.open_tasks()
    }

    pub fn done_tasks(&self) -> Vec<&Task> {
        self.active_list().todos.done_tasks()
    }

    /// Number of save-throughs issued by this session.
    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn board(&self) -> BoardView {
        render_board(&self.registry)
    }

    /// Adds a task to the front of the active list.
    ///
    /// Returns `None` and skips saving when `text` is blank.
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let task = self.registry.resolve_active_mut().todos.add_task(text)?;
        debug!(
            "event=task_add module=service status=ok task_id={}",
            task.id
        );
        self.persist();
        Some(task)
    }

    /// Flips completion of a task in the active list.
    pub fn toggle_task(&mut self, id: TaskId) -> Option<bool> {
        let done = self
            .registry
            .resolve_active_mut()
            .todos
            .toggle_task(id, self.ordering)?;
        debug!("event=task_toggle module=service status=ok task_id={id} done={done}");
        self.persist();
        Some(done)
    }

    /// Removes a task from the active list.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let task = self.registry.resolve_active_mut().todos.remove_task(id)?;
        debug!("event=task_remove module=service status=ok task_id={id}");
        self.persist();
        Some(task)
    }

    /// Creates a list and makes it active.
    pub fn add_list(&mut self, name: &str) -> Result<ListId, AddListError> {
        let id = match self.registry.add_list(name) {
            Ok(list) => list.id,
            Err(err) => {
                debug!("event=list_add module=service status=rejected reason={err}");
                return Err(err);
            }
        };
        info!(
            "event=list_add module=service status=ok list_id={} lists={}",
            id,
            self.registry.list_count()
        );
        self.persist();
        Ok(id)
    }

    /// Switches the active list. Returns `false` for no-op targets.
    pub fn switch_list(&mut self, id: ListId) -> bool {
        if !self.registry.switch_active(id) {
            return false;
        }
        debug!("event=list_switch module=service status=ok list_id={id}");
        self.persist();
        true
    }

    fn persist(&mut self) {
        self.save_count += 1;
        self.store.save(&self.registry);
    }
}

#[cfg(test)]
mod tests {
    use super::TodoService;
    use crate::model::collection::OrderingPolicy;
    use crate::model::registry::{ListRegistry, DEFAULT_LIST_NAME, MAX_LISTS};
    use crate::store::slot::MemoryStateSlot;
    use crate::store::state_store::StateStore;
    use crate::store::{StateSlot, StoreError, StoreResult};
    use uuid::Uuid;

    fn service() -> (MemoryStateSlot, TodoService<MemoryStateSlot>) {
        let slot = MemoryStateSlot::new();
        let store = StateStore::new(slot.clone(), "todos").unwrap();
        (slot, TodoService::open(store, OrderingPolicy::Stable))
    }

    #[test]
    fn buy_milk_scenario() {
        let (_slot, mut service) = service();
        assert_eq!(service.active_list().name, DEFAULT_LIST_NAME);
        assert!(service.active_list().todos.is_empty());

        let task = service.add_task("Buy milk").unwrap();
        assert_eq!(service.open_tasks().len(), 1);
        assert_eq!(service.done_tasks().len(), 0);
        assert_eq!(service.open_tasks()[0].text, "Buy milk");
        assert!(!service.open_tasks()[0].done);

        service.toggle_task(task.id).unwrap();
        assert_eq!(service.open_tasks().len(), 0);
        assert_eq!(service.done_tasks().len(), 1);

        service.remove_task(task.id).unwrap();
        assert!(service.open_tasks().is_empty());
        assert!(service.done_tasks().is_empty());
    }

    #[test]
    fn each_change_saves_exactly_once() {
        let (slot, mut service) = service();
        let task = service.add_task("a").unwrap();
        service.toggle_task(task.id);
        service.add_list("Work").unwrap();
        assert_eq!(service.save_count(), 3);

        let reloaded = StateStore::new(slot, "todos").unwrap().load();
        assert_eq!(&reloaded, service.registry());
    }

    #[test]
    fn rejected_operations_do_not_save() {
        let (slot, mut service) = service();
        assert!(service.add_task("").is_none());
        assert!(service.add_task("   ").is_none());
        assert!(service.toggle_task(Uuid::new_v4()).is_none());
        assert!(service.remove_task(Uuid::new_v4()).is_none());
        assert!(service.add_list(" ").is_err());
        let active = service.registry().active_list_id();
        assert!(!service.switch_list(active));
        assert!(!service.switch_list(Uuid::new_v4()));

        assert_eq!(service.save_count(), 0);
        assert_eq!(slot.raw("todos"), None);
        assert_eq!(service.registry(), &ListRegistry::default());
    }

    #[test]
    fn tasks_follow_the_active_list() {
        let (_slot, mut service) = service();
        let home = service.registry().active_list_id();
        service.add_task("home task").unwrap();
        let work = service.add_list("Work").unwrap();
        assert!(service.active_list().todos.is_empty());
        service.add_task("work task").unwrap();

        assert!(service.switch_list(home));
        assert_eq!(service.open_tasks()[0].text, "home task");
        assert!(service.switch_list(work));
        assert_eq!(service.open_tasks()[0].text, "work task");
    }

    #[test]
    fn list_capacity_is_enforced() {
        let (_slot, mut service) = service();
        for _ in 0..4 {
            service.add_list("Work").unwrap();
        }
        assert!(service.add_list("Extra").is_err());
        assert_eq!(service.registry().list_count(), MAX_LISTS);
        assert_eq!(service.save_count(), 4);
    }

    #[test]
    fn open_first_ordering_is_applied_on_toggle() {
        let slot = MemoryStateSlot::new();
        let store = StateStore::new(slot, "todos").unwrap();
        let mut service = TodoService::open(store, OrderingPolicy::OpenFirst);
        let older = service.add_task("older").unwrap();
        let newer = service.add_task("newer").unwrap();

        service.toggle_task(newer.id);
        let ids: Vec<_> = service.active_list().todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[test]
    fn failed_saves_keep_the_session_working() {
        let store = StateStore::new(RefusingSlot, "todos").unwrap();
        let mut service = TodoService::open(store, OrderingPolicy::Stable);

        let task = service.add_task("Buy milk").unwrap();
        assert_eq!(service.open_tasks().len(), 1);
        assert_eq!(service.toggle_task(task.id), Some(true));
        assert_eq!(service.done_tasks()[0].id, task.id);
        let work = service.add_list("Work").unwrap();
        assert_eq!(service.registry().active_list_id(), work);

        assert_eq!(service.save_count(), 3);
        assert!(service.store().try_load().unwrap().is_none());
    }

    struct RefusingSlot;

    impl StateSlot for RefusingSlot {
        fn read(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }
}
