//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/toggle/edit/remove/list entry points for presentation.
//! - Run every mutation as one read-modify-write cycle against the store.
//!
//! # Invariants
//! - Rejected input never triggers a store write.
//! - Collection order is insertion order; edits and toggles keep positions.
//! - Removing a missing id is a no-op, not an error.
//! - Mutations never overwrite a collection that could not be read; only
//!   corrupt stored data is replaced as if empty.

use crate::model::task::{normalize_text, normalize_time, Task, TaskId, TaskValidationError};
use crate::query::due::is_overdue;
use crate::query::filter::TaskFilter;
use crate::repo::task_store::{StoreError, TaskStore};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type TaskResult<T> = Result<T, TaskError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskError {
    /// Input rejected; nothing was written.
    Validation(TaskValidationError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// The collection could not be read or saved; nothing was changed.
    Storage(StoreError),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TaskError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Task manager over an injected store.
#[derive(Clone)]
pub struct TaskManager {
    store: Arc<dyn TaskStore>,
}

impl TaskManager {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Shared handle to the backing store.
    pub fn store(&self) -> Arc<dyn TaskStore> {
        Arc::clone(&self.store)
    }

    /// Creates an open task and appends it to the collection.
    ///
    /// # Errors
    /// - `Validation` when `text` trims to empty (no write happens).
    /// - `Storage` when the collection cannot be saved.
    pub fn add(
        &self,
        text: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> TaskResult<Task> {
        let task = Task::new(text, date, time).inspect_err(|_| {
            warn!("event=task_add module=service status=rejected reason=empty_text");
        })?;

        let mut tasks = self.load_for_write()?;
        tasks.push(task.clone());
        self.persist("task_add", &tasks)?;

        info!(
            "event=task_add module=service status=ok task_id={} dated={} timed={}",
            task.id,
            task.date.is_some(),
            task.time.is_some()
        );
        Ok(task)
    }

    /// Flips completion state of one task.
    pub fn toggle_completed(&self, id: TaskId) -> TaskResult<Task> {
        let mut tasks = self.load_for_write()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.toggle();
        let updated = task.clone();

        self.persist("task_toggle", &tasks)?;
        info!(
            "event=task_toggle module=service status=ok task_id={id} completed={}",
            updated.completed
        );
        Ok(updated)
    }

    /// Replaces text, date and time of one task.
    ///
    /// `None` clears the date or time.
    pub fn edit(
        &self,
        id: TaskId,
        text: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> TaskResult<Task> {
        let text = normalize_text(text)?;

        let mut tasks = self.load_for_write()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.text = text;
        task.date = date;
        task.time = time.map(normalize_time);
        let updated = task.clone();

        self.persist("task_edit", &tasks)?;
        info!("event=task_edit module=service status=ok task_id={id}");
        Ok(updated)
    }

    /// Removes one task. Missing ids are ignored.
    pub fn remove(&self, id: TaskId) -> TaskResult<()> {
        let mut tasks = self.load_for_write()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            info!("event=task_remove module=service status=noop task_id={id}");
            return Ok(());
        }

        self.persist("task_remove", &tasks)?;
        info!("event=task_remove module=service status=ok task_id={id}");
        Ok(())
    }

    /// Removes every completed task and returns how many were dropped.
    pub fn clear_completed(&self) -> TaskResult<usize> {
        let mut tasks = self.load_for_write()?;
        let before = tasks.len();
        tasks.retain(|task| !task.completed);
        let removed = before - tasks.len();
        if removed > 0 {
            self.persist("task_clear_completed", &tasks)?;
        }
        info!("event=task_clear_completed module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Lists tasks matching `filter` in insertion order.
    pub fn list(&self, filter: TaskFilter) -> Vec<Task> {
        filter.apply(&self.store.load_all())
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.store.load_all().into_iter().find(|task| task.id == id)
    }

    /// Lists open tasks whose due instant is before `now`.
    pub fn overdue(&self, now: NaiveDateTime) -> Vec<Task> {
        self.store
            .load_all()
            .into_iter()
            .filter(|task| is_overdue(task, now))
            .collect()
    }

    fn load_for_write(&self) -> TaskResult<Vec<Task>> {
        match self.store.try_load_all() {
            Ok(tasks) => Ok(tasks),
            Err(err) if err.is_corrupt_data() => {
                warn!("event=store_load module=service status=degraded reason=corrupt_data error={err}");
                Ok(Vec::new())
            }
            Err(err) => {
                warn!("event=store_load module=service status=error error_code=store_read_failed error={err}");
                Err(TaskError::Storage(err))
            }
        }
    }

    fn persist(&self, event: &'static str, tasks: &[Task]) -> TaskResult<()> {
        self.store.save_all(tasks).map_err(|err| {
            warn!("event={event} module=service status=error error_code=store_save_failed error={err}");
            TaskError::Storage(err)
        })
    }
}
