//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical to-do record and its wire shape.
//! - Parse and format the `YYYY-MM-DD` / `HH:MM` fields used in storage.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is trimmed and never empty.
//! - `time` is independent of `date`; reminders need both.
//! - `time` carries whole seconds only, matching what storage keeps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one task.
///
/// Generated as UUID v7, so ids sort by creation time.
pub type TaskId = Uuid;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for times of day; seconds are appended only when non-zero.
pub const TIME_FORMAT: &str = "%H:%M";
const TIME_FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

/// Validation failure for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming.
    EmptyText,
    /// Nil UUID is reserved and never identifies a task.
    NilId,
    /// Date is not `YYYY-MM-DD`.
    InvalidDate(String),
    /// Time is not `HH:MM` (or `HH:MM:SS`).
    InvalidTime(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::NilId => write!(f, "task id must not be nil"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected YYYY-MM-DD"),
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected HH:MM"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical to-do record.
///
/// Serialized with the field names `id`, `text`, `completed`, `date`, `time`.
/// Deserialization goes through validation, so a decoded task always
/// satisfies [`Task::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(serialize_with = "serialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_time")]
    pub time: Option<NaiveTime>,
}

impl Task {
    /// Creates an open task with a freshly generated id.
    ///
    /// # Errors
    /// - `EmptyText` when `text` trims to empty.
    pub fn new(
        text: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::now_v7(), text, date, time)
    }

    /// Creates an open task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        text: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            text: normalize_text(text)?,
            completed: false,
            date,
            time: time.map(normalize_time),
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks the record invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Flips completion state.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Returns the concrete moment a reminder targets.
    ///
    /// `None` unless both `date` and `time` are set.
    pub fn reminder_instant(&self) -> Option<NaiveDateTime> {
        match (self.date, self.time) {
            (Some(date), Some(time)) => Some(date.and_time(time)),
            _ => None,
        }
    }
}

/// Trims `text` and rejects blank input.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

/// Drops sub-second precision.
pub fn normalize_time(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Parses an optional `YYYY-MM-DD` value; blank input means "no date".
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| TaskValidationError::InvalidDate(trimmed.to_string()))
}

/// Parses an optional `HH:MM` value; blank input means "no time".
pub fn parse_time(value: &str) -> Result<Option<NaiveTime>, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, TIME_FORMAT_WITH_SECONDS))
        .map(Some)
        .map_err(|_| TaskValidationError::InvalidTime(trimmed.to_string()))
}

#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, deserialize_with = "deserialize_date")]
    date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_time")]
    time: Option<NaiveTime>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: record.id,
            text: record.text,
            completed: record.completed,
            date: record.date,
            time: record.time.map(normalize_time),
        };
        task.validate()?;
        Ok(task)
    }
}

fn serialize_date<S: Serializer>(value: &Option<NaiveDate>, ser: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(date) => ser.serialize_str(&date.format(DATE_FORMAT).to_string()),
        None => ser.serialize_none(),
    }
}

fn serialize_time<S: Serializer>(value: &Option<NaiveTime>, ser: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) if time.second() == 0 => {
            ser.serialize_str(&time.format(TIME_FORMAT).to_string())
        }
        Some(time) => ser.serialize_str(&time.format(TIME_FORMAT_WITH_SECONDS).to_string()),
        None => ser.serialize_none(),
    }
}

fn deserialize_date<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(de)? {
        Some(raw) => parse_date(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_time<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveTime>, D::Error> {
    match Option::<String>::deserialize(de)? {
        Some(raw) => parse_time(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
