//! Command line arguments.

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use lazytask_core::{parse_date, parse_time, TaskFilter};
use std::path::PathBuf;
use std::str::FromStr;

/// LazyTask: dated to-do list with due-soon reminders.
#[derive(Debug, Parser)]
#[command(name = "lazytask", version = lazytask_core::core_version(), about)]
pub struct Cli {
    /// SQLite database file; overrides `[storage] db_path`.
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Task commands. ID may be any unique prefix of a task id.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Add a task.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Due date, YYYY-MM-DD.
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
        /// Due time, HH:MM.
        #[arg(long, value_parser = time_arg)]
        time: Option<NaiveTime>,
    },

    /// List tasks.
    List {
        #[arg(default_value = "all", value_parser = TaskFilter::from_str)]
        filter: TaskFilter,
    },

    /// Flip a task between open and completed.
    Toggle { id: String },

    /// Replace a task's text; date and time are kept unless given or cleared.
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[arg(long, value_parser = date_arg, conflicts_with = "no_date")]
        date: Option<NaiveDate>,
        #[arg(long)]
        no_date: bool,
        #[arg(long, value_parser = time_arg, conflicts_with = "no_time")]
        time: Option<NaiveTime>,
        #[arg(long)]
        no_time: bool,
    },

    /// Delete a task.
    #[command(alias = "rm")]
    Remove { id: String },

    /// Delete every completed task.
    ClearCompleted,

    /// Print the stored collection as JSON.
    Export,

    /// Replace the stored collection with a JSON export.
    Import { file: PathBuf },

    /// Print reminders for tasks coming due until Ctrl-C.
    Watch,
}

/// How `edit` treats one optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T: Copy> FieldEdit<T> {
    pub fn from_flags(value: Option<T>, clear: bool) -> Self {
        match (value, clear) {
            (Some(value), _) => Self::Set(value),
            (None, true) => Self::Clear,
            (None, false) => Self::Keep,
        }
    }

    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "date must not be blank".to_string())
}

fn time_arg(raw: &str) -> Result<NaiveTime, String> {
    parse_time(raw)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "time must not be blank".to_string())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, FieldEdit};
    use chrono::{NaiveDate, NaiveTime};
    use clap::{CommandFactory, Parser};
    use lazytask_core::TaskFilter;
    use std::path::PathBuf;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("lazytask").chain(line.split_whitespace()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_schedule_and_global_flags() {
        let cli = parse("add see dentist --date 2024-03-05 --time 14:30 --db /tmp/t.db")
            .expect("valid args");
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
        assert_eq!(
            cli.command,
            Command::Add {
                text: vec!["see".to_string(), "dentist".to_string()],
                date: NaiveDate::from_ymd_opt(2024, 3, 5),
                time: NaiveTime::from_hms_opt(14, 30, 0),
            }
        );

        let cli = parse("-c custom.toml export").expect("config before command");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn parses_list_filters() {
        assert_eq!(
            parse("list").expect("list").command,
            Command::List {
                filter: TaskFilter::All
            }
        );
        assert_eq!(
            parse("list completed").expect("list").command,
            Command::List {
                filter: TaskFilter::Completed
            }
        );
        assert!(parse("list later").is_err());
    }

    #[test]
    fn edit_distinguishes_keep_set_and_clear() {
        let cli = parse("edit 0190 text --no-date --time 08:00").expect("valid edit");
        let Command::Edit {
            id,
            date,
            no_date,
            time,
            no_time,
            ..
        } = cli.command
        else {
            panic!("expected edit");
        };
        assert_eq!(id, "0190");
        assert_eq!(FieldEdit::from_flags(date, no_date), FieldEdit::Clear);
        assert_eq!(
            FieldEdit::from_flags(time, no_time),
            FieldEdit::Set(NaiveTime::from_hms_opt(8, 0, 0).expect("time"))
        );

        assert!(parse("edit 0190 text --date 2024-01-01 --no-date").is_err());
        assert_eq!(FieldEdit::<u8>::from_flags(None, false), FieldEdit::Keep);
        assert_eq!(FieldEdit::<u8>::Keep.resolve(Some(3)), Some(3));
    }

    #[test]
    fn remove_accepts_rm_alias() {
        assert_eq!(
            parse("rm 0190").expect("alias").command,
            Command::Remove {
                id: "0190".to_string()
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("").is_err());
        assert!(parse("add").is_err());
        assert!(parse("add x --date tomorrow").is_err());
        assert!(parse("add x --time 25:00").is_err());
        assert!(parse("frobnicate").is_err());
    }
}
