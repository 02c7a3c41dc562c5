//! List filters for task views.

use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// View filter over the task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    /// Not completed.
    Active,
    Completed,
}

impl TaskFilter {
    /// Stable string id (`all|active|completed`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Returns matching tasks in their original order.
    pub fn apply<'a, I>(self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect()
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterError(pub String);

impl Display for ParseFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported filter `{}`; expected all|active|completed",
            self.0
        )
    }
}

impl Error for ParseFilterError {}

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskFilter;
    use crate::model::task::Task;

    fn sample() -> Vec<Task> {
        let open = Task::new("open", None, None).expect("valid task");
        let mut done = Task::new("done", None, None).expect("valid task");
        done.toggle();
        let other = Task::new("other", None, None).expect("valid task");
        vec![open, done, other]
    }

    #[test]
    fn active_and_completed_partition_the_list() {
        let tasks = sample();
        let active = TaskFilter::Active.apply(&tasks);
        let completed = TaskFilter::Completed.apply(&tasks);

        assert_eq!(
            active.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["open", "other"]
        );
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].text, "done");
        assert_eq!(TaskFilter::All.apply(&tasks), tasks);
    }

    #[test]
    fn parses_known_filters_case_insensitively() {
        assert_eq!("ACTIVE".parse::<TaskFilter>(), Ok(TaskFilter::Active));
        assert_eq!(" all ".parse::<TaskFilter>(), Ok(TaskFilter::All));
        assert!("someday".parse::<TaskFilter>().is_err());
    }
}
