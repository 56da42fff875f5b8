//! Remote task collection SPI, error envelope and subscription handle.

use crate::model::task::{Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operation stage a remote error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    Subscribe,
    Create,
    Update,
    Delete,
}

impl RemoteStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Stable error envelope for remote failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub stage: RemoteStage,
    /// Machine-readable code, e.g. `not_found`.
    pub code: String,
    pub message: String,
    /// Whether repeating the same call may succeed.
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(
        stage: RemoteStage,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            stage,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remote {} failed [{}]: {}",
            self.stage.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for RemoteError {}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Receives every full snapshot.
pub type SnapshotHandler = Box<dyn Fn(Vec<Task>) + Send + Sync>;
/// Receives feed-level failures.
pub type FeedErrorHandler = Box<dyn Fn(RemoteError) + Send + Sync>;

/// Live, ordered, mutable task collection.
///
/// Mutations never touch caller state directly; their effect is observed
/// through the next snapshot.
pub trait RemoteTaskProvider: Send + Sync {
    /// Starts a live feed. The current snapshot is delivered before returning.
    fn subscribe(
        &self,
        on_snapshot: SnapshotHandler,
        on_error: FeedErrorHandler,
    ) -> RemoteResult<Subscription>;

    /// Appends an open task; the backend assigns id and `created_at`.
    fn create(&self, text: &str) -> RemoteResult<TaskId>;

    fn set_done(&self, id: TaskId, done: bool) -> RemoteResult<()>;

    fn remove(&self, id: TaskId) -> RemoteResult<()>;
}

/// Cancellation handle for a live feed.
///
/// Cancels on `unsubscribe` or on drop, whichever happens first, and never
/// twice.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_once();
    }

    fn cancel_once(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_once();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteError, RemoteStage, Subscription};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn subscription_cancels_once_on_unsubscribe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        subscription.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscription_cancels_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        {
            let _subscription = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_display_includes_stage_and_code() {
        let err = RemoteError::new(RemoteStage::Delete, "not_found", "gone", false);
        assert_eq!(err.to_string(), "remote delete failed [not_found]: gone");
    }
}
