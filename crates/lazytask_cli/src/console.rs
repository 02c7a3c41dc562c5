//! Terminal notification host for `lazytask watch`.

use async_trait::async_trait;
use lazytask_core::{format_display, NotificationHost, Permission, Reminder};
use std::collections::HashSet;
use std::sync::Mutex;

/// Prints reminders to stdout; a repeated tag is shown as an update.
#[derive(Default)]
pub struct ConsoleNotificationHost {
    seen_tags: Mutex<HashSet<String>>,
}

impl ConsoleNotificationHost {
    pub fn render(&self, reminder: &Reminder) -> String {
        let repeated = match self.seen_tags.lock() {
            Ok(mut tags) => !tags.insert(reminder.tag.clone()),
            Err(_) => false,
        };
        let when = reminder
            .due_at
            .map(|due| format!(" ({})", format_display(due.date(), Some(due.time()))))
            .unwrap_or_default();
        let marker = if repeated { " [updated]" } else { "" };
        format!("{}{marker}: {}{when}", reminder.title, reminder.body)
    }
}

#[async_trait]
impl NotificationHost for ConsoleNotificationHost {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, reminder: &Reminder) {
        println!("\u{7}{}", self.render(reminder));
    }
}
