//! Persistent store adapter.
//!
//! # Responsibility
//! - Define the raw string slot contract (`StateSlot`) and its backends.
//! - Load and save full registry snapshots under an injected storage key.
//!
//! # Invariants
//! - Loading never fails its caller; malformed data degrades to the default
//!   registry.
//! - Save failures are logged and swallowed; in-memory state is untouched.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod slot;
pub mod state_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by slot access and snapshot coding.
#[derive(Debug)]
pub enum StoreError {
    /// Storage key is blank after trimming.
    InvalidKey(String),
    /// Backend transport failure.
    Db(DbError),
    /// Slot content is not a recognizable snapshot.
    Malformed(String),
    /// Snapshot could not be serialized.
    Encode(serde_json::Error),
    /// Backend-specific failure without a richer type.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Malformed(message) => write!(f, "malformed stored state: {message}"),
            Self::Encode(err) => write!(f, "failed to encode state: {err}"),
            Self::Unavailable(message) => write!(f, "state slot unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw durable key-value slot.
///
/// Implementations store opaque strings; snapshot coding lives in
/// `StateStore`.
pub trait StateSlot {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Trims a storage key and rejects blank values.
pub fn normalize_storage_key(key: &str) -> StoreResult<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(trimmed.to_string())
}
