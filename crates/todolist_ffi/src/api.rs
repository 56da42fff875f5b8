//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board operations to Dart via FRB as synchronous calls.
//! - Return a fresh board projection with every response.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call names its storage key; the database path is process-wide.
//! - Rejected input returns `ok=false` with the unchanged board.

use log::warn;
use std::sync::OnceLock;
use todolist_core::db::open_db;
use todolist_core::view::{ListSwitcherView, TaskItemView, TaskRegionView};
use todolist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppConfig, BoardView, SqliteStateSlot, StateStore, TodoService,
};
use uuid::Uuid;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTaskItem {
    pub task_id: String,
    pub text: String,
    pub done: bool,
}

/// One entry in the list switcher menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardListEntry {
    pub list_id: String,
    pub name: String,
    pub active: bool,
    pub task_count: u32,
}

/// Flattened board projection for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub header: String,
    pub lists: Vec<BoardListEntry>,
    pub list_count_indicator: String,
    pub can_add_list: bool,
    pub open_items: Vec<BoardTaskItem>,
    pub open_empty_message: Option<String>,
    pub done_items: Vec<BoardTaskItem>,
    pub done_empty_message: Option<String>,
}

/// Action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    /// Whether state changed as requested.
    pub ok: bool,
    /// Id of the created task or list, when any.
    pub created_id: Option<String>,
    /// Human-readable diagnostics for UI.
    pub message: String,
    /// `None` only when storage could not be opened.
    pub board: Option<BoardSnapshot>,
}

/// Returns the current board for `storage_key`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_load(storage_key: String) -> BoardResponse {
    with_board(&storage_key, "board_load", |_| Ok((None, "Loaded.".to_string())))
}

/// Adds a task to the active list.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(storage_key: String, text: String) -> BoardResponse {
    with_board(&storage_key, "board_add_task", |service| {
        match service.add_task(&text) {
            Some(task) => Ok((Some(task.id.to_string()), "Task added.".to_string())),
            None => Err("Task text must not be blank.".to_string()),
        }
    })
}

/// Flips completion of a task in the active list.
#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_task(storage_key: String, task_id: String) -> BoardResponse {
    with_board(&storage_key, "board_toggle_task", |service| {
        let id = parse_id(&task_id)?;
        match service.toggle_task(id) {
            Some(true) => Ok((None, "Task done.".to_string())),
            Some(false) => Ok((None, "Task reopened.".to_string())),
            None => Err(format!("Task not found: {id}")),
        }
    })
}

/// Removes a task from the active list.
#[flutter_rust_bridge::frb(sync)]
pub fn board_remove_task(storage_key: String, task_id: String) -> BoardResponse {
    with_board(&storage_key, "board_remove_task", |service| {
        let id = parse_id(&task_id)?;
        service
            .remove_task(id)
            .map(|_| (None, "Task removed.".to_string()))
            .ok_or_else(|| format!("Task not found: {id}"))
    })
}

/// Creates a list and makes it active.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_list(storage_key: String, name: String) -> BoardResponse {
    with_board(&storage_key, "board_add_list", |service| {
        service
            .add_list(&name)
            .map(|id| (Some(id.to_string()), "List added.".to_string()))
            .map_err(|err| err.to_string())
    })
}

/// Switches the active list.
#[flutter_rust_bridge::frb(sync)]
pub fn board_switch_list(storage_key: String, list_id: String) -> BoardResponse {
    with_board(&storage_key, "board_switch_list", |service| {
        let id = parse_id(&list_id)?;
        if service.switch_list(id) {
            Ok((None, "List switched.".to_string()))
        } else {
            Err(format!("List already active or unknown: {id}"))
        }
    })
}

type ActionOutcome = Result<(Option<String>, String), String>;

fn with_board(
    storage_key: &str,
    operation: &str,
    action: impl FnOnce(&mut TodoService<SqliteStateSlot<'_>>) -> ActionOutcome,
) -> BoardResponse {
    let config = resolve_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return storage_failure(operation, format!("DB open failed: {err}")),
    };
    let store = match StateStore::new(SqliteStateSlot::new(&conn), storage_key) {
        Ok(store) => store,
        Err(err) => return storage_failure(operation, err.to_string()),
    };
    let mut service = TodoService::open(store, config.ordering);

    let (ok, created_id, message) = match action(&mut service) {
        Ok((created_id, message)) => (true, created_id, message),
        Err(message) => (false, None, message),
    };
    BoardResponse {
        ok,
        created_id,
        message,
        board: Some(to_snapshot(service.board())),
    }
}

fn storage_failure(operation: &str, message: String) -> BoardResponse {
    warn!("event=ffi_call module=ffi status=error op={operation} error={message}");
    BoardResponse {
        ok: false,
        created_id: None,
        message: format!("{operation} failed: {message}"),
        board: None,
    }
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("Invalid id: `{value}`"))
}

fn resolve_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(|| {
        AppConfig::from_env().unwrap_or_else(|err| {
            warn!("event=ffi_config module=ffi status=fallback error={err}");
            AppConfig::default()
        })
    })
}

fn to_snapshot(view: BoardView) -> BoardSnapshot {
    let BoardView {
        header,
        switcher,
        open,
        done,
        ..
    } = view;
    let ListSwitcherView {
        entries,
        count_indicator,
        can_add_list,
    } = switcher;
    let (open_items, open_empty_message) = split_region(open);
    let (done_items, done_empty_message) = split_region(done);

    BoardSnapshot {
        header,
        lists: entries
            .into_iter()
            .map(|entry| BoardListEntry {
                list_id: entry.id.to_string(),
                name: entry.name,
                active: entry.active,
                task_count: u32::try_from(entry.task_count).unwrap_or(u32::MAX),
            })
            .collect(),
        list_count_indicator: count_indicator,
        can_add_list,
        open_items,
        open_empty_message,
        done_items,
        done_empty_message,
    }
}

fn split_region(region: TaskRegionView) -> (Vec<BoardTaskItem>, Option<String>) {
    let items = region.items.into_iter().map(to_item).collect();
    (items, region.empty_message.map(str::to_string))
}

fn to_item(item: TaskItemView) -> BoardTaskItem {
    BoardTaskItem {
        task_id: item.id.to_string(),
        text: item.text,
        done: item.done,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_add_list, board_add_task, board_load, board_remove_task, board_switch_list,
        board_toggle_task, core_version, init_logging, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_key(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn fresh_key_loads_default_board() {
        let response = board_load(unique_key("ffi-load"));
        assert!(response.ok, "{}", response.message);
        let board = response.board.expect("board should be present");
        assert_eq!(board.header, "Meine Todos");
        assert_eq!(board.list_count_indicator, "1/5");
        assert!(board.open_items.is_empty());
        assert!(board.open_empty_message.is_some());
    }

    #[test]
    fn task_lifecycle_round_trips_through_storage() {
        let key = unique_key("ffi-task");
        let added = board_add_task(key.clone(), "Buy milk".to_string());
        assert!(added.ok, "{}", added.message);
        let task_id = added.created_id.expect("task id");

        let toggled = board_toggle_task(key.clone(), task_id.clone());
        assert!(toggled.ok, "{}", toggled.message);
        let board = toggled.board.unwrap();
        assert!(board.open_items.is_empty());
        assert_eq!(board.done_items[0].task_id, task_id);

        let removed = board_remove_task(key.clone(), task_id.clone());
        assert!(removed.ok);
        let board = board_load(key.clone()).board.unwrap();
        assert!(board.done_items.is_empty());

        let missing = board_toggle_task(key, task_id);
        assert!(!missing.ok);
    }

    #[test]
    fn blank_text_and_bad_ids_are_rejected() {
        let key = unique_key("ffi-reject");
        assert!(!board_add_task(key.clone(), "   ".to_string()).ok);
        let bad = board_remove_task(key.clone(), "not-a-uuid".to_string());
        assert!(!bad.ok);
        assert!(bad.message.contains("Invalid id"));
        assert!(bad.board.is_some());
        assert!(!board_load(key).board.unwrap().open_items.iter().any(|_| true));
    }

    #[test]
    fn list_capacity_and_switching() {
        let key = unique_key("ffi-lists");
        let home_id = board_load(key.clone()).board.unwrap().lists[0].list_id.clone();
        for n in 0..4 {
            assert!(board_add_list(key.clone(), format!("List {n}")).ok);
        }
        let extra = board_add_list(key.clone(), "Extra".to_string());
        assert!(!extra.ok);
        let board = extra.board.unwrap();
        assert_eq!(board.lists.len(), 5);
        assert!(!board.can_add_list);

        let switched = board_switch_list(key.clone(), home_id.clone());
        assert!(switched.ok, "{}", switched.message);
        assert_eq!(switched.board.unwrap().header, "Meine Todos");
        assert!(!board_switch_list(key, home_id).ok);
    }
}
