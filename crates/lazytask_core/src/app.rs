//! Application composition root.
//!
//! # Responsibility
//! - Wire one store into the task manager and reminder scheduler.
//! - Own the sweep lifecycle from start to `destroy`.

use crate::model::task::Task;
use crate::notify::host::{NotificationHost, Permission};
use crate::notify::scheduler::{ArmState, ReminderScheduler, ReminderSettings, SweepHandle};
use crate::query::filter::TaskFilter;
use crate::repo::task_store::TaskStore;
use crate::service::task_manager::{TaskManager, TaskResult};
use chrono::{NaiveDate, NaiveTime};
use log::info;
use std::sync::Arc;

/// Running task app: manager plus an active reminder sweep.
pub struct TaskApp {
    manager: TaskManager,
    scheduler: ReminderScheduler,
    sweep: Option<SweepHandle>,
}

impl TaskApp {
    /// Loads state, asks for notification permission once and starts the sweep.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn start(
        store: Arc<dyn TaskStore>,
        host: Option<Arc<dyn NotificationHost>>,
        settings: ReminderSettings,
    ) -> Self {
        let manager = TaskManager::new(Arc::clone(&store));
        let scheduler = ReminderScheduler::new(store, host).with_settings(settings);

        let loaded = manager.list(TaskFilter::All).len();
        let permission = scheduler.request_permission().await;
        let sweep = scheduler.start();
        info!(
            "event=app_ready module=app status=ok tasks={loaded} permission={}",
            permission.as_str()
        );

        Self {
            manager,
            scheduler,
            sweep: Some(sweep),
        }
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Adds a task; asks for permission again when the task can be reminded.
    pub async fn add(
        &self,
        text: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> TaskResult<Task> {
        let task = self.manager.add(text, date, time)?;
        if task.reminder_instant().is_some() && self.scheduler.state() == ArmState::Unarmed {
            let permission = self.scheduler.request_permission().await;
            if permission != Permission::Granted {
                info!(
                    "event=app_add module=app status=ok reminders=off permission={}",
                    permission.as_str()
                );
            }
        }
        Ok(task)
    }

    /// Stops the sweep; no reminder fires afterwards.
    pub async fn destroy(mut self) {
        if let Some(sweep) = self.sweep.take() {
            sweep.shutdown().await;
        }
        info!("event=app_destroy module=app status=ok");
    }
}
