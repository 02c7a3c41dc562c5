//! Task store contract and SQLite key-value implementation.
//!
//! # Responsibility
//! - Keep the canonical task collection under one named key.
//! - Serialize the collection as a JSON array of task records.
//!
//! # Invariants
//! - `save_all` replaces the stored value in a single statement.
//! - `save_all` refuses collections with duplicate ids or invalid tasks.
//! - `load_all` never returns an error; failures are logged and read as empty.
//! - Stored collections with duplicate ids are treated as corrupt.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::Task;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Storage key holding the task collection.
pub const TASKS_KEY: &str = "todos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure. Non-fatal for callers: the process keeps running.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialize(serde_json::Error),
    InvalidData(String),
    /// A previous writer panicked while holding the connection.
    Unavailable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "task storage unavailable: {err}"),
            Self::Serialize(err) => write!(f, "task collection is not valid JSON: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored task data: {message}"),
            Self::Unavailable(reason) => write!(f, "task storage unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl StoreError {
    /// Stored value exists but cannot be decoded into a valid collection.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::Serialize(_) | Self::InvalidData(_))
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

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Whole-collection task persistence.
pub trait TaskStore: Send + Sync {
    /// Strict read: surfaces storage and decode failures.
    fn try_load_all(&self) -> StoreResult<Vec<Task>>;

    /// Returns the stored collection, or an empty one when nothing usable is stored.
    fn load_all(&self) -> Vec<Task> {
        self.try_load_all().unwrap_or_else(|err| {
            warn!("event=store_load module=repo status=degraded error={err}");
            Vec::new()
        })
    }

    /// Replaces the stored collection.
    fn save_all(&self, tasks: &[Task]) -> StoreResult<()>;
}

/// SQLite-backed key-value task store.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteTaskStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, TASKS_KEY)
    }

    /// Wraps a migrated connection and stores tasks under `key`.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            key: key.into(),
        }
    }

    /// Opens a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Returns the stored collection as a pretty JSON document.
    pub fn export_json(&self) -> StoreResult<String> {
        let tasks = self.try_load_all()?;
        Ok(serde_json::to_string_pretty(&tasks)?)
    }

    /// Validates `json` and replaces the stored collection with it.
    ///
    /// Returns the number of imported tasks.
    pub fn import_json(&self, json: &str) -> StoreResult<usize> {
        let tasks = decode_tasks(json)?;
        self.save_all(&tasks)?;
        info!(
            "event=store_import module=repo status=ok count={}",
            tasks.len()
        );
        Ok(tasks.len())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned"))
    }

    fn read_raw(&self) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl TaskStore for SqliteTaskStore {
    fn try_load_all(&self) -> StoreResult<Vec<Task>> {
        match self.read_raw()? {
            Some(raw) => decode_tasks(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn load_all(&self) -> Vec<Task> {
        match self.try_load_all() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    "event=store_load module=repo status=degraded key={} error={}",
                    self.key, err
                );
                Vec::new()
            }
        }
    }

    fn save_all(&self, tasks: &[Task]) -> StoreResult<()> {
        check_collection(tasks).inspect_err(|err| {
            warn!(
                "event=store_save module=repo status=rejected key={} count={} error={err}",
                self.key,
                tasks.len()
            );
        })?;
        let encoded = serde_json::to_string(tasks)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), encoded],
        )
        .map_err(|err| {
            error!(
                "event=store_save module=repo status=error key={} count={} error={}",
                self.key,
                tasks.len(),
                err
            );
            err
        })?;
        Ok(())
    }
}

/// Decodes a stored JSON collection, rejecting duplicate ids.
pub fn decode_tasks(raw: &str) -> StoreResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw)?;
    check_collection(&tasks)?;
    Ok(tasks)
}

/// Checks every task and id uniqueness across the collection.
pub fn check_collection(tasks: &[Task]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate()
            .map_err(|err| StoreError::InvalidData(format!("task `{}`: {err}", task.id)))?;
        if !seen.insert(task.id) {
            return Err(StoreError::InvalidData(format!(
                "duplicate task id `{}`",
                task.id
            )));
        }
    }
    Ok(())
}
