//! Remote sync adapter.
//!
//! # Responsibility
//! - Define the realtime task collection SPI (`RemoteTaskProvider`).
//! - Provide an in-process reference backend (`InMemoryTaskFeed`).
//!
//! # Invariants
//! - Snapshots are full collections ordered by `created_at` descending.
//! - A `Subscription` cancels exactly once.

pub mod memory_feed;
pub mod provider;
