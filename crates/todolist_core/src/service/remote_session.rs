//! Client-side state for the realtime remote feed.
//!
//! # Responsibility
//! - Mirror the latest remote snapshot (full replace, last snapshot wins).
//! - Hold the draft input and submit it as a remote create.
//! - Track every remote mutation as pending, succeeded or failed; keep only
//!   the failed ones once settled.
//!
//! # Invariants
//! - Local tasks change only through snapshots; mutations are never applied
//!   optimistically. Full replace is safe because the session keeps no
//!   local-only edits between snapshots.
//! - A failed create restores the draft unless the user already typed a new one.
//! - After `close`, the subscription is cancelled exactly once and late
//!   snapshots are ignored.

use crate::model::task::{normalize_text, Task, TaskId};
use crate::sync::provider::{RemoteError, RemoteResult, RemoteTaskProvider, Subscription};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// What a tracked mutation asked the backend to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Create { text: String },
    SetDone { task_id: TaskId, done: bool },
    Remove { task_id: TaskId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    Pending,
    Succeeded,
    Failed { error: RemoteError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Session-local sequence number.
    pub id: u64,
    pub kind: MutationKind,
    pub status: MutationStatus,
}

impl MutationRecord {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, MutationStatus::Failed { .. })
    }
}

#[derive(Default)]
struct FeedMirror {
    tasks: Vec<Task>,
    last_error: Option<RemoteError>,
    snapshots_seen: u64,
    closed: bool,
}

/// Live view over a `RemoteTaskProvider`.
pub struct RemoteTodoSession<P: RemoteTaskProvider + ?Sized> {
    provider: Arc<P>,
    mirror: Arc<Mutex<FeedMirror>>,
    subscription: Option<Subscription>,
    draft: String,
    mutations: Vec<MutationRecord>,
    next_mutation_id: u64,
}

impl<P: RemoteTaskProvider + ?Sized> RemoteTodoSession<P> {
    /// Subscribes to `provider` and mirrors its first snapshot.
    pub fn open(provider: Arc<P>) -> RemoteResult<Self> {
        let mirror = Arc::new(Mutex::new(FeedMirror::default()));
        let snapshot_sink = Arc::clone(&mirror);
        let error_sink = Arc::clone(&mirror);

        let subscription = provider
            .subscribe(
                Box::new(move |tasks| {
                    let mut mirror = lock(&snapshot_sink);
                    if mirror.closed {
                        return;
                    }
                    mirror.tasks = tasks;
                    mirror.snapshots_seen += 1;
                }),
                Box::new(move |err| {
                    error!("event=feed_error module=service status=error error={err}");
                    let mut mirror = lock(&error_sink);
                    if !mirror.closed {
                        mirror.last_error = Some(err);
                    }
                }),
            )
            .map_err(|err| {
                error!("event=feed_subscribe module=service status=error error={err}");
                err
            })?;

        info!("event=feed_subscribe module=service status=ok");
        Ok(Self {
            provider,
            mirror,
            subscription: Some(subscription),
            draft: String::new(),
            mutations: Vec::new(),
            next_mutation_id: 1,
        })
    }

    /// Current snapshot, newest first.
    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.mirror).tasks.clone()
    }

    pub fn open_tasks(&self) -> Vec<Task> {
        lock(&self.mirror)
            .tasks
            .iter()
            .filter(|task| !task.done)
            .cloned()
            .collect()
    }

    pub fn done_tasks(&self) -> Vec<Task> {
        lock(&self.mirror)
            .tasks
            .iter()
            .filter(|task| task.done)
            .cloned()
            .collect()
    }

    pub fn snapshots_seen(&self) -> u64 {
        lock(&self.mirror).snapshots_seen
    }

    /// Most recent feed-level failure, if any.
    pub fn last_feed_error(&self) -> Option<RemoteError> {
        lock(&self.mirror).last_error.clone()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Unsettled and failed mutations. Succeeded records are dropped on settle.
    pub fn mutations(&self) -> &[MutationRecord] {
        &self.mutations
    }

    pub fn failed_mutations(&self) -> Vec<&MutationRecord> {
        self.mutations.iter().filter(|record| record.is_failed()).collect()
    }

    /// Forgets every failed mutation.
    pub fn dismiss_failures(&mut self) {
        self.mutations.retain(|record| !record.is_failed());
    }

    pub fn is_closed(&self) -> bool {
        self.subscription.is_none()
    }

    /// Submits the draft as a new remote task.
    ///
    /// Returns `None` when the draft is blank. The draft is cleared before the
    /// remote call and restored if the call fails.
    pub fn submit_draft(&mut self) -> Option<MutationRecord> {
        let text = normalize_text(&self.draft)?;
        self.draft.clear();

        let provider = Arc::clone(&self.provider);
        let record = self.track(MutationKind::Create { text: text.clone() }, || {
            provider.create(&text).map(|_| ())
        });
        if record.is_failed() && self.draft.is_empty() {
            self.draft = text;
        }
        Some(record)
    }

    /// Requests the opposite completion flag for `id`.
    ///
    /// Returns `None` when `id` is not in the current snapshot.
    pub fn toggle(&mut self, id: TaskId) -> Option<MutationRecord> {
        let done = !self.find(id)?.done;
        let provider = Arc::clone(&self.provider);
        Some(self.track(MutationKind::SetDone { task_id: id, done }, || {
            provider.set_done(id, done)
        }))
    }

    /// Requests deletion of `id`.
    pub fn remove(&mut self, id: TaskId) -> Option<MutationRecord> {
        self.find(id)?;
        let provider = Arc::clone(&self.provider);
        Some(self.track(MutationKind::Remove { task_id: id }, || provider.remove(id)))
    }

    /// Cancels the feed. Idempotent.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            lock(&self.mirror).closed = true;
            subscription.unsubscribe();
            info!("event=feed_close module=service status=ok");
        }
    }

    fn find(&self, id: TaskId) -> Option<Task> {
        lock(&self.mirror)
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    fn track(
        &mut self,
        kind: MutationKind,
        call: impl FnOnce() -> RemoteResult<()>,
    ) -> MutationRecord {
        let id = self.next_mutation_id;
        self.next_mutation_id += 1;
        self.mutations.push(MutationRecord {
            id,
            kind,
            status: MutationStatus::Pending,
        });

        let status = match call() {
            Ok(()) => MutationStatus::Succeeded,
            Err(error) => {
                warn!(
                    "event=remote_mutation module=service status=error mutation_id={} stage={} code={} retryable={}",
                    id,
                    error.stage.as_str(),
                    error.code,
                    error.retryable
                );
                MutationStatus::Failed { error }
            }
        };

        // The record was pushed above and nothing removes it in between.
        let index = self.mutations.len() - 1;
        self.mutations[index].status = status;
        if self.mutations[index].is_failed() {
            self.mutations[index].clone()
        } else {
            self.mutations.remove(index)
        }
    }
}

impl<P: RemoteTaskProvider + ?Sized> Drop for RemoteTodoSession<P> {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock(mirror: &Mutex<FeedMirror>) -> MutexGuard<'_, FeedMirror> {
    mirror
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
