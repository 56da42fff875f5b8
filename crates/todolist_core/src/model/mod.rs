//! Domain model for tasks, lists and the list registry.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted wire shape (`lists`, `activeListId`) in one place.
//!
//! # Invariants
//! - Every task and list is identified by a stable UUID that is never reused.
//! - Task text is trimmed and never blank once a task exists.
//! - A registry always holds between one and `MAX_LISTS` lists.

pub mod collection;
pub mod list;
pub mod registry;
pub mod task;
