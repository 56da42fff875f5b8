//! Core state logic for the to-do list application.
//! This crate is the single source of truth for task and list invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod sync;
pub mod view;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::{DuplicateTaskId, OrderingPolicy, TaskCollection};
pub use model::list::{ListId, TodoList};
pub use model::registry::{
    AddListError, ListRegistry, RegistryShapeError, DEFAULT_LIST_ID, DEFAULT_LIST_NAME, MAX_LISTS,
};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use service::remote_session::{
    MutationKind, MutationRecord, MutationStatus, RemoteTodoSession,
};
pub use service::todo_service::TodoService;
pub use store::slot::{MemoryStateSlot, SqliteStateSlot};
pub use store::state_store::{decode_state, StateStore};
pub use store::{StateSlot, StoreError, StoreResult};
pub use sync::memory_feed::InMemoryTaskFeed;
pub use sync::provider::{
    FeedErrorHandler, RemoteError, RemoteResult, RemoteStage, RemoteTaskProvider,
    SnapshotHandler, Subscription,
};
pub use view::{render_board, render_feed, BoardView, FeedView, TaskRegionView, TaskStats};

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
