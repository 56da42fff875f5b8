//! In-process realtime task collection.
//!
//! # Responsibility
//! - Back `RemoteTaskProvider` without a network, for tests and offline use.
//! - Assign ids and strictly increasing `created_at` values.
//! - Push a full snapshot to every listener after each change.
//!
//! # Invariants
//! - Listeners run outside the internal lock, so a handler may call back
//!   into the feed.
//! - A cancelled listener never receives another snapshot.

use crate::model::task::{normalize_text, now_epoch_ms, Task, TaskId};
use crate::sync::provider::{
    FeedErrorHandler, RemoteError, RemoteResult, RemoteStage, RemoteTaskProvider,
    SnapshotHandler, Subscription,
};
use log::{debug, warn};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

struct Listener {
    on_snapshot: Arc<SnapshotHandler>,
    on_error: Arc<FeedErrorHandler>,
}

#[derive(Default)]
struct FeedState {
    tasks: Vec<Task>,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
    last_created_at: i64,
    injected_failures: VecDeque<RemoteError>,
}

impl FeedState {
    /// Ordered by `created_at` descending, newest first.
    fn snapshot(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    fn take_failure(&mut self, stage: RemoteStage) -> Option<RemoteError> {
        let index = self
            .injected_failures
            .iter()
            .position(|failure| failure.stage == stage)?;
        self.injected_failures.remove(index)
    }
}

/// Shared in-memory collection. Clones observe the same state.
#[derive(Clone, Default)]
pub struct InMemoryTaskFeed {
    state: Arc<Mutex<FeedState>>,
}

impl InMemoryTaskFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `error.stage` fail with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        lock(&self.state).injected_failures.push_back(error);
    }

    /// Pushes a feed-level failure to every listener.
    pub fn emit_error(&self, error: RemoteError) {
        let handlers: Vec<_> = lock(&self.state)
            .listeners
            .values()
            .map(|listener| Arc::clone(&listener.on_error))
            .collect();
        for handler in handlers {
            handler(error.clone());
        }
    }

    pub fn snapshot(&self) -> Vec<Task> {
        lock(&self.state).snapshot()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    fn notify(&self) {
        let (snapshot, handlers) = {
            let state = lock(&self.state);
            let handlers: Vec<_> = state
                .listeners
                .values()
                .map(|listener| Arc::clone(&listener.on_snapshot))
                .collect();
            (state.snapshot(), handlers)
        };
        debug!(
            "event=feed_notify module=sync status=ok listeners={} tasks={}",
            handlers.len(),
            snapshot.len()
        );
        for handler in handlers {
            handler(snapshot.clone());
        }
    }
}

impl RemoteTaskProvider for InMemoryTaskFeed {
    fn subscribe(
        &self,
        on_snapshot: SnapshotHandler,
        on_error: FeedErrorHandler,
    ) -> RemoteResult<Subscription> {
        let (listener_id, snapshot, handler) = {
            let mut state = lock(&self.state);
            if let Some(failure) = state.take_failure(RemoteStage::Subscribe) {
                return Err(failure);
            }
            let listener_id = state.next_listener_id;
            state.next_listener_id += 1;
            let on_snapshot = Arc::new(on_snapshot);
            state.listeners.insert(
                listener_id,
                Listener {
                    on_snapshot: Arc::clone(&on_snapshot),
                    on_error: Arc::new(on_error),
                },
            );
            (listener_id, state.snapshot(), on_snapshot)
        };
        handler(snapshot);

        let state = Arc::downgrade(&self.state);
        Ok(Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).listeners.remove(&listener_id);
                debug!("event=feed_unsubscribe module=sync status=ok listener={listener_id}");
            }
        }))
    }

    fn create(&self, text: &str) -> RemoteResult<TaskId> {
        let id = {
            let mut state = lock(&self.state);
            if let Some(failure) = state.take_failure(RemoteStage::Create) {
                return Err(failure);
            }
            let text = normalize_text(text).ok_or_else(|| {
                RemoteError::new(
                    RemoteStage::Create,
                    "invalid_text",
                    "task text must not be blank",
                    false,
                )
            })?;
            let created_at = now_epoch_ms().max(state.last_created_at + 1);
            state.last_created_at = created_at;
            let id = Uuid::new_v4();
            state.tasks.push(Task {
                id,
                text,
                done: false,
                created_at: Some(created_at),
            });
            id
        };
        self.notify();
        Ok(id)
    }

    fn set_done(&self, id: TaskId, done: bool) -> RemoteResult<()> {
        {
            let mut state = lock(&self.state);
            if let Some(failure) = state.take_failure(RemoteStage::Update) {
                return Err(failure);
            }
            let task = state
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| not_found(RemoteStage::Update, id))?;
            task.done = done;
        }
        self.notify();
        Ok(())
    }

    fn remove(&self, id: TaskId) -> RemoteResult<()> {
        {
            let mut state = lock(&self.state);
            if let Some(failure) = state.take_failure(RemoteStage::Delete) {
                return Err(failure);
            }
            let index = state
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| not_found(RemoteStage::Delete, id))?;
            state.tasks.remove(index);
        }
        self.notify();
        Ok(())
    }
}

fn not_found(stage: RemoteStage, id: TaskId) -> RemoteError {
    RemoteError::new(stage, "not_found", format!("task not found: {id}"), false)
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("event=feed_lock module=sync status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}
