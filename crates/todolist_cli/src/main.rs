//! Command-line front end.
//!
//! # Responsibility
//! - Load the board, apply one action, save through, print the board.
//! - Resolve configuration from `TODOLIST_*` variables, then flags.

mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use todolist_core::db::open_db;
use todolist_core::{
    init_logging, AppConfig, OrderingPolicy, SqliteStateSlot, StateStore, TodoService,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Manage to-do lists stored in a local SQLite file")]
struct Cli {
    /// SQLite file holding the state slot.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Storage key of the state slot.
    #[arg(long, global = true)]
    key: Option<String>,

    /// Re-sort open tasks before done tasks after each toggle.
    #[arg(long, global = true)]
    open_first: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the active list.
    Show,
    /// Add a task to the active list.
    Add { text: Vec<String> },
    /// Toggle a task by id or id prefix.
    Toggle { task: String },
    /// Remove a task by id or id prefix.
    Remove { task: String },
    /// Manage lists.
    #[command(subcommand)]
    List(ListCommand),
    /// Print core health information.
    Ping,
}

#[derive(Subcommand)]
enum ListCommand {
    /// Create a list and make it active.
    Add { name: Vec<String> },
    /// Switch the active list by id, id prefix or exact name.
    Switch { list: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, &log_dir.to_string_lossy())?;
    }

    let command = cli.command.unwrap_or(Command::Show);
    if let Command::Ping = command {
        return Ok(format!(
            "todolist_core ping={} version={}",
            todolist_core::ping(),
            todolist_core::core_version()
        ));
    }

    let conn = open_db(&config.db_path).map_err(|err| format!("cannot open database: {err}"))?;
    let store = StateStore::new(SqliteStateSlot::new(&conn), &config.storage_key)
        .map_err(|err| err.to_string())?;
    let mut service = TodoService::open(store, config.ordering);

    let notice = apply(&mut service, command)?;
    let board = render::board_text(&service.board());
    Ok(match notice {
        Some(notice) => format!("{notice}\n\n{board}"),
        None => board,
    })
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(key) = &cli.key {
        config.set_storage_key(key).map_err(|err| err.to_string())?;
    }
    if cli.open_first {
        config.ordering = OrderingPolicy::OpenFirst;
    }
    Ok(config)
}

fn apply(
    service: &mut TodoService<SqliteStateSlot<'_>>,
    command: Command,
) -> Result<Option<String>, String> {
    match command {
        Command::Show | Command::Ping => Ok(None),
        Command::Add { text } => service
            .add_task(&text.join(" "))
            .map(|task| Some(format!("added {}", render::short_id(task.id))))
            .ok_or_else(|| "task text must not be blank".to_string()),
        Command::Toggle { task } => {
            let id = resolve_task(service, &task)?;
            service
                .toggle_task(id)
                .map(|done| Some(if done { "done" } else { "reopened" }.to_string()))
                .ok_or_else(|| format!("no task matches `{task}`"))
        }
        Command::Remove { task } => {
            let id = resolve_task(service, &task)?;
            service
                .remove_task(id)
                .map(|removed| Some(format!("removed {}", render::short_id(removed.id))))
                .ok_or_else(|| format!("no task matches `{task}`"))
        }
        Command::List(ListCommand::Add { name }) => service
            .add_list(&name.join(" "))
            .map(|id| Some(format!("created list {}", render::short_id(id))))
            .map_err(|err| err.to_string()),
        Command::List(ListCommand::Switch { list }) => {
            let id = resolve_list(service, &list)?;
            if service.switch_list(id) {
                Ok(Some("switched".to_string()))
            } else {
                Ok(Some("already active".to_string()))
            }
        }
    }
}

fn resolve_task(
    service: &TodoService<SqliteStateSlot<'_>>,
    needle: &str,
) -> Result<Uuid, String> {
    let ids = service.active_list().todos.iter().map(|task| task.id);
    resolve_id(ids, needle).ok_or_else(|| format!("no unique task matches `{needle}`"))
}

fn resolve_list(
    service: &TodoService<SqliteStateSlot<'_>>,
    needle: &str,
) -> Result<Uuid, String> {
    let lists = service.registry().lists();
    if let Some(list) = lists.iter().find(|list| list.name == needle.trim()) {
        return Ok(list.id);
    }
    resolve_id(lists.iter().map(|list| list.id), needle)
        .ok_or_else(|| format!("no unique list matches `{needle}`"))
}

/// Matches a full id or a unique prefix of its hyphenated form.
fn resolve_id(ids: impl Iterator<Item = Uuid>, needle: &str) -> Option<Uuid> {
    let needle = needle.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }
    let mut matches = ids.filter(|id| id.to_string().starts_with(&needle));
    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}
