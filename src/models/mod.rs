//! Data models for Taskbook entities.
//!
//! This module defines the core data structures:
//! - `Task` - A to-do item as it is stored and persisted
//! - `NewTask` - The user-supplied fields of a task before it has an ID
//! - `TaskUpdate` - A partial edit where blank values mean "keep current"
//!
//! Task files use PascalCase keys (`ID`, `Title`, `DueDate`, ...) with due
//! dates written as midnight-UTC timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Date format accepted at prompts and used for display and filtering.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Due date stored when the entered date could not be parsed.
pub const UNSET_DUE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(date) => date,
    None => panic!("0001-01-01 is a valid date"),
};

/// A to-do item tracked by Taskbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /// Numeric identifier, unique at assignment time
    #[serde(rename = "ID", default)]
    pub id: u64,

    /// Task title
    #[serde(default)]
    pub title: String,

    /// Completion flag
    #[serde(default)]
    pub complete: bool,

    /// Free-form priority label (e.g. "high")
    #[serde(default)]
    pub priority: String,

    /// Calendar due date
    #[serde(default = "unset_due_date", with = "due_date_format")]
    pub due_date: NaiveDate,

    /// Tags in the order they were entered
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,

    /// Free-form category
    #[serde(default)]
    pub category: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,
}

impl Task {
    /// Build a stored task from user-supplied fields and an assigned ID.
    pub fn from_new(id: u64, new: NewTask) -> Self {
        Self {
            id,
            title: new.title,
            complete: false,
            priority: new.priority,
            due_date: new.due_date,
            tags: new.tags,
            category: new.category,
            description: new.description,
        }
    }

    /// "Complete" or "Incomplete".
    pub fn status_label(&self) -> &'static str {
        if self.complete { "Complete" } else { "Incomplete" }
    }

    /// Due date rendered as `yyyy-mm-dd`.
    pub fn due_date_string(&self) -> String {
        self.due_date.format(DATE_FORMAT).to_string()
    }

    /// Whether this task is selected by a free-form filter query.
    ///
    /// Matches if the title contains the query (case-sensitive), the priority
    /// equals it ignoring case, or the formatted due date equals it exactly.
    pub fn matches_query(&self, query: &str) -> bool {
        self.title.contains(query)
            || self.priority.to_lowercase() == query.to_lowercase()
            || self.due_date_string() == query
    }

    /// Whether this task is incomplete and its due date (midnight UTC) lies
    /// strictly before `now`.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.complete && due_instant(self.due_date) < now
    }
}

/// The fields a user supplies when adding a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub priority: String,
    pub due_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl NewTask {
    /// Create a task draft with the given title and every other field blank.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: String::new(),
            due_date: UNSET_DUE_DATE,
            category: String::new(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A partial edit of a task.
///
/// `None` and empty strings both leave the field unchanged. The due date is
/// carried as raw text and only applied when it parses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
}

impl TaskUpdate {
    /// Create an update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

/// Parse a `yyyy-mm-dd` due date.
///
/// Only the zero-padded ten-character form is accepted: `2024-5-1` and
/// `+2024-05-01` are rejected.
pub fn parse_due_date(input: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate(input.to_string());
    if !has_date_shape(input) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())
}

fn has_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Split a comma-separated tag string.
///
/// Tokens are neither trimmed nor de-duplicated, and an empty input yields a
/// single empty tag.
pub fn split_tags(input: &str) -> Vec<String> {
    input.split(',').map(String::from).collect()
}

/// The instant a due date falls due: midnight UTC at the start of that day.
fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn unset_due_date() -> NaiveDate {
    UNSET_DUE_DATE
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Due dates are written as RFC 3339 timestamps at midnight UTC and read back
/// from either a timestamp or a bare `yyyy-mm-dd` date.
mod due_date_format {
    use chrono::{DateTime, NaiveDate, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{DATE_FORMAT, due_instant};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&due_instant(*date).to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(timestamp.date_naive());
        }
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|_| de::Error::custom(format!("invalid DueDate: {}", raw)))
    }
}
