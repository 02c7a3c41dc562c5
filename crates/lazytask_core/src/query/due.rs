//! Due-time predicates and display labels.
//!
//! # Invariants
//! - Overdue checks default a missing time to end of day (23:59).
//! - Display formatting defaults a missing time to start of day, but never
//!   prints it.

use crate::model::task::Task;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const END_OF_DAY_HOUR: u32 = 23;
const END_OF_DAY_MINUTE: u32 = 59;

/// Instant used for overdue checks.
///
/// `None` when the task has no date.
pub fn due_instant(task: &Task) -> Option<NaiveDateTime> {
    let date = task.date?;
    let time = task.time.unwrap_or_else(end_of_day);
    Some(date.and_time(time))
}

/// Returns whether an open, dated task is past its due instant.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    if task.completed {
        return false;
    }
    match due_instant(task) {
        Some(due) => due < now,
        None => false,
    }
}

/// Renders a short due label: `Mar 5` or `Mar 5, 02:30 PM`.
pub fn format_display(date: NaiveDate, time: Option<NaiveTime>) -> String {
    let instant = date.and_time(time.unwrap_or(NaiveTime::MIN));
    match time {
        Some(_) => instant.format("%b %-d, %I:%M %p").to_string(),
        None => instant.format("%b %-d").to_string(),
    }
}

/// Label for a task, or `None` when it has no date.
pub fn task_label(task: &Task) -> Option<String> {
    task.date.map(|date| format_display(date, task.time))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(END_OF_DAY_HOUR, END_OF_DAY_MINUTE, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::{due_instant, format_display, is_overdue};
    use crate::model::task::Task;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").expect("valid instant")
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[test]
    fn overdue_compares_against_exact_time() {
        let task = Task::new("standup", Some(date("2020-01-01")), Some(time(10, 0)))
            .expect("valid task");

        assert!(is_overdue(&task, at("2020-01-01T10:01")));
        assert!(!is_overdue(&task, at("2020-01-01T09:59")));
        assert!(!is_overdue(&task, at("2020-01-01T10:00")));
    }

    #[test]
    fn missing_time_means_end_of_day() {
        let task = Task::new("report", Some(date("2020-01-01")), None).expect("valid task");

        assert_eq!(due_instant(&task), Some(at("2020-01-01T23:59")));
        assert!(!is_overdue(&task, at("2020-01-01T23:58")));
        assert!(is_overdue(&task, at("2020-01-02T00:00")));
    }

    #[test]
    fn completed_or_undated_tasks_are_never_overdue() {
        let mut done = Task::new("old", Some(date("1999-01-01")), Some(time(8, 0)))
            .expect("valid task");
        done.toggle();
        let undated = Task::new("someday", None, Some(time(8, 0))).expect("valid task");
        let now = at("2030-01-01T00:00");

        assert!(!is_overdue(&done, now));
        assert!(!is_overdue(&undated, now));
    }

    #[test]
    fn format_display_omits_time_when_absent() {
        assert_eq!(format_display(date("2024-03-05"), None), "Mar 5");
        assert_eq!(
            format_display(date("2024-03-05"), Some(time(14, 30))),
            "Mar 5, 02:30 PM"
        );
        assert_eq!(
            format_display(date("2024-12-25"), Some(time(9, 5))),
            "Dec 25, 09:05 AM"
        );
    }
}
