//! LazyTask command line front end.
//!
//! # Responsibility
//! - Map terminal commands onto `lazytask_core` task operations.
//! - Render task lists with due labels and overdue markers.

mod args;
mod console;

use args::{Cli, Command, FieldEdit};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use console::ConsoleNotificationHost;
use lazytask_core::{
    init_logging, is_overdue, task_label, AppConfig, NotificationHost, SqliteTaskStore, Task,
    TaskApp, TaskFilter, TaskId, TaskManager, TaskStore,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_CONFIG_FILE_NAME: &str = "lazytask.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE_NAME));
    let config = AppConfig::load(&config_path).map_err(|err| err.to_string())?;
    start_logging(&config);

    let db_path = cli.db.unwrap_or_else(|| config.storage.db_path.clone());
    let store = Arc::new(SqliteTaskStore::open(&db_path).map_err(|err| err.to_string())?);
    let manager = TaskManager::new(store.clone());

    match cli.command {
        Command::Add { text, date, time } => {
            let task = manager
                .add(&text.join(" "), date, time)
                .map_err(|err| err.to_string())?;
            println!("added {}", task.id);
        }
        Command::List { filter } => {
            let now = Local::now().naive_local();
            for task in manager.list(filter) {
                println!("{}", render_task(&task, now));
            }
        }
        Command::Toggle { id } => {
            let id = resolve_id(&manager, &id)?;
            let task = manager.toggle_completed(id).map_err(|err| err.to_string())?;
            let state = if task.completed { "completed" } else { "reopened" };
            println!("{state} {}", task.id);
        }
        Command::Edit {
            id,
            text,
            date,
            no_date,
            time,
            no_time,
        } => {
            let id = resolve_id(&manager, &id)?;
            let current = manager
                .get(id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            let date = FieldEdit::from_flags(date, no_date).resolve(current.date);
            let time = FieldEdit::from_flags(time, no_time).resolve(current.time);
            let task = manager
                .edit(id, &text.join(" "), date, time)
                .map_err(|err| err.to_string())?;
            println!("updated {}", task.id);
        }
        Command::Remove { id } => {
            let id = resolve_id(&manager, &id)?;
            manager.remove(id).map_err(|err| err.to_string())?;
            println!("removed {id}");
        }
        Command::ClearCompleted => {
            let removed = manager.clear_completed().map_err(|err| err.to_string())?;
            println!("removed {removed} completed task(s)");
        }
        Command::Export => {
            println!("{}", store.export_json().map_err(|err| err.to_string())?);
        }
        Command::Import { file: path } => {
            let document = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            let count = store.import_json(&document).map_err(|err| err.to_string())?;
            println!("imported {count} task(s)");
        }
        Command::Watch => watch(store, &config).await?,
    }

    Ok(())
}

async fn watch(store: Arc<SqliteTaskStore>, config: &AppConfig) -> Result<(), String> {
    let store: Arc<dyn TaskStore> = store;
    let host: Arc<dyn NotificationHost> = Arc::new(ConsoleNotificationHost::default());
    let app = TaskApp::start(store, Some(host), config.reminders.settings()).await;
    println!(
        "watching {} open task(s); press Ctrl-C to stop",
        app.manager().list(TaskFilter::Active).len()
    );

    let signal = tokio::signal::ctrl_c().await;
    app.destroy().await;
    signal.map_err(|err| format!("failed to listen for Ctrl-C: {err}"))
}

fn start_logging(config: &AppConfig) {
    let Some(dir) = config.logging.dir.as_deref() else {
        return;
    };
    if let Err(err) = init_logging(&config.logging.level, absolute(dir)) {
        eprintln!("warning: file logging disabled: {err}");
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            warn!("event=cli_logging module=cli status=degraded error={err}");
            path.to_path_buf()
        }
    }
}

fn render_task(task: &Task, now: NaiveDateTime) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let label = task_label(task)
        .map(|label| format!("  ({label})"))
        .unwrap_or_default();
    let overdue = if is_overdue(task, now) { "  OVERDUE" } else { "" };
    format!("{check} {}{label}{overdue}  {}", task.text, task.id)
}

/// Resolves a full id or a unique id prefix.
fn resolve_id(manager: &TaskManager, raw: &str) -> Result<TaskId, String> {
    let needle = raw.trim().to_ascii_lowercase();
    if let Ok(id) = TaskId::parse_str(&needle) {
        return Ok(id);
    }
    if needle.is_empty() {
        return Err("task id must not be empty".to_string());
    }

    let matches: Vec<TaskId> = manager
        .list(TaskFilter::All)
        .into_iter()
        .map(|task| task.id)
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no task id starts with `{needle}`")),
        _ => Err(format!("task id prefix `{needle}` is ambiguous")),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_task, resolve_id};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use lazytask_core::{SqliteTaskStore, TaskManager};
    use std::sync::Arc;

    fn manager() -> TaskManager {
        TaskManager::new(Arc::new(
            SqliteTaskStore::open_in_memory().expect("in-memory store"),
        ))
    }

    #[test]
    fn resolves_full_ids_and_unique_prefixes() {
        let manager = manager();
        let task = manager.add("only", None, None).expect("add");
        let full = task.id.to_string();

        assert_eq!(resolve_id(&manager, &full).expect("full id"), task.id);
        assert_eq!(
            resolve_id(&manager, &full[..12].to_ascii_uppercase()).expect("prefix"),
            task.id
        );
        assert!(resolve_id(&manager, "ffffffff").is_err());
        assert!(resolve_id(&manager, " ").is_err());
    }

    #[test]
    fn render_marks_overdue_tasks() {
        let manager = manager();
        let task = manager
            .add(
                "file taxes",
                NaiveDate::from_ymd_opt(2020, 4, 15),
                NaiveTime::from_hms_opt(17, 0, 0),
            )
            .expect("add");
        let now = NaiveDateTime::parse_from_str("2020-04-16 08:00", "%Y-%m-%d %H:%M")
            .expect("instant");

        let line = render_task(&task, now);
        assert!(line.starts_with("[ ] file taxes  (Apr 15, 05:00 PM)  OVERDUE"));
        assert!(line.ends_with(&task.id.to_string()));
    }
}
