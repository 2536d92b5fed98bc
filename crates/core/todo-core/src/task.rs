//! Task model as exchanged with `/tasks/`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Server-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(TaskId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
}

/// A single to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Username of the owner; the server sends it as `user`.
    #[serde(rename = "user")]
    pub owner: String,
}

impl Task {
    /// Merges the fields carried by `update` into this task. The id never changes.
    pub fn merge(&mut self, update: &TaskUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = Some(updated_at);
        }
        if let Some(owner) = &update.owner {
            self.owner = owner.clone();
        }
    }
}

/// Draft for `POST /tasks/`. The server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
}

impl NewTask {
    /// Trims `title` and rejects it when nothing is left.
    pub fn new(title: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        Ok(Self {
            title: non_empty_title(title.as_ref())?,
            description: None,
            due_date: None,
        })
    }

    /// Blank descriptions are sent as `null`.
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = blank_to_none(description.as_ref());
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// Partial change for `PATCH /tasks/{id}/`.
///
/// For the nullable fields the outer `Option` means "send this field" and the
/// inner one is the value, so `Some(None)` clears it on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        self.title = Some(non_empty_title(title.as_ref())?);
        Ok(self)
    }

    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(blank_to_none(description.as_ref()));
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }
}

/// Server reply to a PATCH: the id plus whichever fields it chose to return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskUpdate {
    pub id: TaskId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "user")]
    pub owner: Option<String>,
}

impl TaskUpdate {
    /// An update that names a task but changes nothing.
    pub fn empty(id: TaskId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            due_date: None,
            completed: None,
            created_at: None,
            updated_at: None,
            owner: None,
        }
    }
}

impl From<Task> for TaskUpdate {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: Some(task.title),
            description: Some(task.description),
            due_date: Some(task.due_date),
            completed: Some(task.completed),
            created_at: Some(task.created_at),
            updated_at: task.updated_at,
            owner: Some(task.owner),
        }
    }
}

/// A present `null` becomes `Some(None)`; an absent field stays `None` via `default`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_empty_title(title: &str) -> Result<String, TaskValidationError> {
    let title = title.trim();
    if title.is_empty() {
        Err(TaskValidationError::EmptyTitle)
    } else {
        Ok(title.to_string())
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
