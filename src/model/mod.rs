pub mod numeric;

pub use numeric::Numeric;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_util::days_between;
use crate::error::{Error, Result};

/// Pipeline stage of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Todo,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn is_open(&self) -> bool {
        !matches!(self, Status::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A task as supplied by the task store.
///
/// Deserializing validates the record: `completedAt` must be present exactly
/// when the task is Done, and may not precede `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTask")]
pub struct TaskRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub revenue: Numeric,
    pub time_taken: Numeric,
    pub roi: Numeric,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskRecord {
    /// An open Todo task with no numeric fields set.
    pub fn new(id: &str, priority: Priority, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            status: Status::Todo,
            priority,
            revenue: Numeric::NONE,
            time_taken: Numeric::NONE,
            roi: Numeric::NONE,
            created_at,
            completed_at: None,
            notes: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Move to an open stage, clearing any completion time.
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        if status.is_open() {
            self.completed_at = None;
        }
        self
    }

    /// Mark Done at `at`.
    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.status = Status::Done;
        self.completed_at = Some(at);
        self
    }

    pub fn revenue(mut self, value: impl Into<Numeric>) -> Self {
        self.revenue = value.into();
        self
    }

    pub fn time_taken(mut self, hours: impl Into<Numeric>) -> Self {
        self.time_taken = hours.into();
        self
    }

    pub fn roi(mut self, value: impl Into<Numeric>) -> Self {
        self.roi = value.into();
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Completion time, only for Done tasks.
    pub fn completion(&self) -> Option<&DateTime<Utc>> {
        if self.is_done() {
            self.completed_at.as_ref()
        } else {
            None
        }
    }

    /// Creation-to-completion span in fractional days, for Done tasks.
    pub fn cycle_days(&self) -> Option<f64> {
        self.completion()
            .map(|done| days_between(&self.created_at, done))
    }

    /// Check the status/completion invariants.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Error::InvalidTask {
            id: self.id.clone(),
            message: message.to_string(),
        };
        match (self.status, self.completed_at) {
            (Status::Done, None) => Err(invalid("Done task has no completedAt")),
            (Status::Done, Some(done)) if done < self.created_at => {
                Err(invalid("completedAt precedes createdAt"))
            }
            (Status::Todo | Status::InProgress, Some(_)) => {
                Err(invalid("open task has a completedAt"))
            }
            _ => Ok(()),
        }
    }
}

impl AsRef<TaskRecord> for TaskRecord {
    fn as_ref(&self) -> &TaskRecord {
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: String,
    #[serde(default)]
    title: Option<String>,
    status: Status,
    priority: Priority,
    #[serde(default)]
    revenue: Numeric,
    #[serde(default)]
    time_taken: Numeric,
    #[serde(default)]
    roi: Numeric,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawTask> for TaskRecord {
    type Error = Error;

    fn try_from(raw: RawTask) -> Result<Self> {
        let task = TaskRecord {
            id: raw.id,
            title: raw.title,
            status: raw.status,
            priority: raw.priority,
            revenue: raw.revenue,
            time_taken: raw.time_taken,
            roi: raw.roi,
            created_at: raw.created_at,
            completed_at: raw.completed_at,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
        };
        task.validate()?;
        Ok(task)
    }
}

/// A task plus fields computed upstream. Unknown fields are carried through
/// untouched; analytics only reads the embedded [`TaskRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTask {
    #[serde(flatten)]
    pub task: TaskRecord,
    #[serde(flatten)]
    pub derived: serde_json::Map<String, serde_json::Value>,
}

impl From<TaskRecord> for DerivedTask {
    fn from(task: TaskRecord) -> Self {
        Self {
            task,
            derived: serde_json::Map::new(),
        }
    }
}

impl AsRef<TaskRecord> for DerivedTask {
    fn as_ref(&self) -> &TaskRecord {
        &self.task
    }
}

/// Parse a JSON array of task objects.
pub fn parse_tasks(json: &str) -> Result<Vec<DerivedTask>> {
    let tasks: Vec<DerivedTask> = serde_json::from_str(json)?;
    log::debug!("Parsed {} tasks", tasks.len());
    Ok(tasks)
}

/// Read and parse a JSON task export.
pub fn load_tasks(path: impl AsRef<std::path::Path>) -> Result<Vec<DerivedTask>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_tasks(&text)
}
