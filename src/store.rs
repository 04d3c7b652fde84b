//! In-memory task store.
//!
//! The store owns the ordered list of tasks for a session. Insertion order is
//! creation order, every lookup is a linear scan by ID, and deletion removes a
//! single element without disturbing the order of the rest.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{NewTask, Task, TaskUpdate, parse_due_date, split_tags};
use crate::{Error, Result};

/// How the store picks the ID of a newly added task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// `number of tasks + 1`. Matches the historical behavior, but a delete
    /// followed by an add can hand out an ID that is still in use.
    #[default]
    Length,
    /// One more than the highest ID this store has ever seen, so IDs are
    /// never reused.
    Next,
}

impl IdPolicy {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "length" => Some(IdPolicy::Length),
            "next" => Some(IdPolicy::Next),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPolicy::Length => "length",
            IdPolicy::Next => "next",
        }
    }
}

impl std::fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered collection of the session's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    policy: IdPolicy,
    /// Highest ID ever held by this store, including deleted tasks.
    highest_id: u64,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new(policy: IdPolicy) -> Self {
        Self {
            tasks: Vec::new(),
            policy,
            highest_id: 0,
        }
    }

    /// Create a store holding previously loaded tasks.
    pub fn with_tasks(tasks: Vec<Task>, policy: IdPolicy) -> Self {
        let mut store = Self::new(policy);
        store.replace_all(tasks);
        store
    }

    /// Replace the full contents of the store.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.highest_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.tasks = tasks;
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn next_id(&self) -> u64 {
        match self.policy {
            IdPolicy::Length => self.tasks.len() as u64 + 1,
            IdPolicy::Next => self.highest_id + 1,
        }
    }

    /// Append a new task and return the stored record.
    ///
    /// Field contents are not validated.
    pub fn add(&mut self, new: NewTask) -> &Task {
        let id = self.next_id();
        if self.policy == IdPolicy::Length && self.tasks.iter().any(|t| t.id == id) {
            warn!(id, "assigned task ID is already in use");
        }
        self.highest_id = self.highest_id.max(id);
        self.tasks.push(Task::from_new(id, new));
        debug!(id, "task added");
        &self.tasks[self.tasks.len() - 1]
    }

    /// Find the first task with the given ID.
    pub fn find_by_id(&self, id: u64) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Apply a partial edit to the first task with the given ID.
    ///
    /// Blank values leave fields unchanged. A due date that does not parse as
    /// `yyyy-mm-dd` is ignored and the current due date is kept.
    pub fn update_by_id(&mut self, id: u64, update: TaskUpdate) -> Result<&Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;

        if let Some(title) = non_empty(update.title) {
            task.title = title;
        }
        if let Some(priority) = non_empty(update.priority) {
            task.priority = priority;
        }
        if let Some(raw) = non_empty(update.due_date) {
            match parse_due_date(&raw) {
                Ok(date) => task.due_date = date,
                Err(e) => warn!(id, error = %e, "keeping current due date"),
            }
        }
        if let Some(category) = non_empty(update.category) {
            task.category = category;
        }
        if let Some(description) = non_empty(update.description) {
            task.description = description;
        }
        if let Some(tags) = non_empty(update.tags) {
            task.tags = split_tags(&tags);
        }

        debug!(id, "task updated");
        Ok(task)
    }

    /// Remove the first task with the given ID and return it.
    pub fn delete_by_id(&mut self, id: u64) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        debug!(id, "task deleted");
        Ok(self.tasks.remove(index))
    }

    /// All tasks in insertion order.
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks matching a predicate, in insertion order.
    pub fn list_where<P>(&self, predicate: P) -> Vec<&Task>
    where
        P: Fn(&Task) -> bool,
    {
        self.tasks.iter().filter(|t| predicate(t)).collect()
    }

    /// Tasks whose title, priority or due date matches a free-form query.
    pub fn filter(&self, query: &str) -> Vec<&Task> {
        self.list_where(|t| t.matches_query(query))
    }

    /// Incomplete tasks whose due date lies before `now`.
    pub fn overdue_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.list_where(|t| t.is_overdue_at(now))
    }

    /// Incomplete tasks whose due date has passed.
    pub fn overdue(&self) -> Vec<&Task> {
        self.overdue_at(Utc::now())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
