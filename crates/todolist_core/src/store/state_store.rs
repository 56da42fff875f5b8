//! Registry snapshot load/save over a `StateSlot`.
//!
//! # Responsibility
//! - Encode the full registry as JSON under one injected storage key.
//! - Decode stored snapshots, including the single-list legacy shape.
//!
//! # Invariants
//! - `load` never returns an error; it falls back to `ListRegistry::default()`.
//! - `save` writes the whole registry, never a partial field.
//! - For a well-formed registry `x`, loading after `save(x)` yields `x`.
//!
//! # Stored shapes
//! - `{ "lists": [...], "activeListId": "<uuid>" }` (current).
//! - `[ { "id": <number|string>, "text": "...", "done": bool }, ... ]`
//!   (legacy single list; migrated into the default list). Legacy ids were
//!   timestamps and may repeat; a repeated id gets a distinct derived id.

use crate::model::collection::TaskCollection;
use crate::model::list::TodoList;
use crate::model::registry::{ListRegistry, DEFAULT_LIST_ID, DEFAULT_LIST_NAME};
use crate::model::task::{Task, TaskId};
use crate::store::{normalize_storage_key, StateSlot, StoreError, StoreResult};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// Namespace for deterministic ids derived from legacy numeric task ids.
const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x1e6a_c7d0_7a5c_4b1e_9f00_6c65_6761_6379);

#[derive(Debug, Deserialize)]
struct LegacyTask {
    id: Value,
    text: String,
    #[serde(default)]
    done: bool,
}

/// Snapshot persistence for one storage key.
pub struct StateStore<S: StateSlot> {
    slot: S,
    key: String,
}

impl<S: StateSlot> StateStore<S> {
    /// Creates a store bound to `key`.
    ///
    /// # Errors
    /// - `InvalidKey` when `key` is blank.
    pub fn new(slot: S, key: &str) -> StoreResult<Self> {
        Ok(Self {
            slot,
            key: normalize_storage_key(key)?,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Loads the stored registry or the default one.
    pub fn load(&self) -> ListRegistry {
        match self.try_load() {
            Ok(Some(registry)) => {
                info!(
                    "event=state_load module=store status=ok key={} lists={}",
                    self.key,
                    registry.list_count()
                );
                registry
            }
            Ok(None) => {
                info!(
                    "event=state_load module=store status=empty key={}",
                    self.key
                );
                ListRegistry::default()
            }
            Err(err) => {
                warn!(
                    "event=state_load module=store status=fallback key={} error={}",
                    self.key, err
                );
                ListRegistry::default()
            }
        }
    }

    /// Loads the stored registry, surfacing read and decode failures.
    ///
    /// Returns `Ok(None)` when the slot has never been written.
    pub fn try_load(&self) -> StoreResult<Option<ListRegistry>> {
        match self.slot.read(&self.key)? {
            Some(raw) => decode_state(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Writes the full registry. Returns whether the write succeeded.
    ///
    /// Failures are logged and never propagated.
    pub fn save(&self, registry: &ListRegistry) -> bool {
        match self.try_save(registry) {
            Ok(()) => {
                debug!("event=state_save module=store status=ok key={}", self.key);
                true
            }
            Err(err) => {
                error!(
                    "event=state_save module=store status=error key={} error={}",
                    self.key, err
                );
                false
            }
        }
    }

    pub fn try_save(&self, registry: &ListRegistry) -> StoreResult<()> {
        let encoded = serde_json::to_string(registry).map_err(StoreError::Encode)?;
        self.slot.write(&self.key, &encoded)
    }
}

/// Decodes one stored snapshot.
///
/// # Errors
/// - `Malformed` when `raw` is not JSON, not an object/array, or violates
///   registry/task invariants.
pub fn decode_state(raw: &str) -> StoreResult<ListRegistry> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| StoreError::Malformed(err.to_string()))?;
    match value {
        Value::Object(_) => serde_json::from_value::<ListRegistry>(value)
            .map_err(|err| StoreError::Malformed(err.to_string())),
        Value::Array(items) => decode_legacy(items),
        other => Err(StoreError::Malformed(format!(
            "expected object or array, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_legacy(items: Vec<Value>) -> StoreResult<ListRegistry> {
    let mut tasks = Vec::with_capacity(items.len());
    let mut seen = HashSet::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let legacy: LegacyTask =
            serde_json::from_value(item).map_err(|err| StoreError::Malformed(err.to_string()))?;
        let mut id = legacy_task_id(&legacy.id)?;
        if !seen.insert(id) {
            id = Uuid::new_v5(&LEGACY_ID_NAMESPACE, format!("{id}:{index}").as_bytes());
            seen.insert(id);
        }
        let mut task = Task::with_id(id, &legacy.text)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        task.done = legacy.done;
        tasks.push(task);
    }

    info!(
        "event=state_migrate module=store status=ok source=legacy_array tasks={}",
        tasks.len()
    );
    let mut list = TodoList::with_id(DEFAULT_LIST_ID, DEFAULT_LIST_NAME);
    list.todos =
        TaskCollection::try_from(tasks).map_err(|err| StoreError::Malformed(err.to_string()))?;
    Ok(ListRegistry::with_list(list))
}

fn legacy_task_id(value: &Value) -> StoreResult<TaskId> {
    match value {
        Value::String(text) => Ok(Uuid::parse_str(text)
            .ok()
            .filter(|id| !id.is_nil())
            .unwrap_or_else(|| Uuid::new_v5(&LEGACY_ID_NAMESPACE, text.as_bytes()))),
        Value::Number(number) => Ok(Uuid::new_v5(
            &LEGACY_ID_NAMESPACE,
            number.to_string().as_bytes(),
        )),
        other => Err(StoreError::Malformed(format!(
            "legacy task id must be number or string, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
