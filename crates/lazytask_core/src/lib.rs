//! Core domain logic for LazyTask.
//! This crate is the single source of truth for task invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod query;
pub mod repo;
pub mod service;

pub use app::TaskApp;
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{parse_date, parse_time, Task, TaskId, TaskValidationError};
pub use notify::host::{LogNotificationHost, NotificationHost, Permission, Reminder};
pub use notify::scheduler::{ArmState, ReminderScheduler, ReminderSettings, SweepHandle};
pub use query::due::{due_instant, format_display, is_overdue, task_label};
pub use query::filter::{ParseFilterError, TaskFilter};
pub use repo::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use service::task_manager::{TaskError, TaskManager, TaskResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
