//! Notification host capability.

use crate::model::task::{Task, TaskId};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::info;

/// Title used for every due-soon reminder.
pub const REMINDER_TITLE: &str = "Task Due Soon";

/// Host answer to a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The host cannot show notifications at all.
    Unsupported,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Unsupported => "unsupported",
        }
    }
}

/// One reminder handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: TaskId,
    pub title: String,
    /// Task text.
    pub body: String,
    /// Stable per task; hosts replace an earlier reminder with the same tag.
    pub tag: String,
    pub due_at: Option<NaiveDateTime>,
}

impl Reminder {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id,
            title: REMINDER_TITLE.to_string(),
            body: task.text.clone(),
            tag: reminder_tag(task.id),
            due_at: task.reminder_instant(),
        }
    }
}

/// Coalescing tag for reminders of one task.
pub fn reminder_tag(id: TaskId) -> String {
    format!("todo-{id}")
}

/// Platform notification surface.
#[async_trait]
pub trait NotificationHost: Send + Sync {
    /// Asks the user for permission; resolves once the host decides.
    async fn request_permission(&self) -> Permission;
    /// Current permission, including changes made outside the app.
    fn permission(&self) -> Permission;
    fn show(&self, reminder: &Reminder);
}

/// Host that writes reminders to the log only.
///
/// Useful for headless runs where no desktop notification surface exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationHost;

#[async_trait]
impl NotificationHost for LogNotificationHost {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, reminder: &Reminder) {
        info!(
            "event=reminder_show module=notify status=ok host=log tag={}",
            reminder.tag
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{reminder_tag, Reminder, REMINDER_TITLE};
    use crate::model::task::Task;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn reminder_uses_task_text_and_stable_tag() {
        let task = Task::new(
            "water plants",
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveTime::from_hms_opt(8, 30, 0),
        )
        .expect("valid task");

        let reminder = Reminder::for_task(&task);
        assert_eq!(reminder.title, REMINDER_TITLE);
        assert_eq!(reminder.body, "water plants");
        assert_eq!(reminder.tag, format!("todo-{}", task.id));
        assert_eq!(reminder.tag, reminder_tag(task.id));
        assert_eq!(reminder.due_at, task.reminder_instant());
    }
}
