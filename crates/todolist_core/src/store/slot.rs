//! `StateSlot` backends.

use crate::store::{StateSlot, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// SQLite-backed slot over the `state_slots` table.
///
/// The connection must come from `db::open_db*` so migrations are applied.
pub struct SqliteStateSlot<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateSlot<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateSlot for SqliteStateSlot<'_> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT slot_value FROM state_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO state_slots (slot_key, slot_value)
             VALUES (?1, ?2)
             ON CONFLICT(slot_key) DO UPDATE SET
                slot_value = excluded.slot_value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process slot. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateSlot {
    values: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStateSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing snapshot coding.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.values.borrow_mut().insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl StateSlot for MemoryStateSlot {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.insert_raw(key, value);
        Ok(())
    }
}
