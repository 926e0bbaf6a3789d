//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its enums.
//! - Provide validated constructors and mutation helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is trimmed and non-empty.
//! - `due_at >= created_at` whenever `due_at` is set.
//! - `completed_at` is `Some` exactly when `completed` is `true`.
//! - Every mutation refreshes `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

pub type TaskResult<T> = Result<T, TaskValidationError>;

/// Task category used for grouping and filtering in views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Personal,
    Work,
    Shopping,
    Study,
    Other,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 5] = [
        Self::Personal,
        Self::Work,
        Self::Shopping,
        Self::Study,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Shopping => "shopping",
            Self::Study => "study",
            Self::Other => "other",
        }
    }
}

/// Task priority, totally ordered `Low < Medium < High < Critical`.
///
/// Variant order is load-bearing: the derived `Ord` follows declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Numeric sort weight, `0` for `Low` through `3` for `Critical`.
    pub fn weight(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Validation failures for task construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Due date is earlier than the task creation time.
    InvalidDueDate {
        created_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    },
    /// Caller-provided id is the nil UUID.
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title cannot be empty."),
            Self::InvalidDueDate { created_at, due_at } => write!(
                f,
                "Due date cannot be earlier than creation date (due {}, created {}).",
                due_at.to_rfc3339(),
                created_at.to_rfc3339()
            ),
            Self::NilId => write!(f, "Task id must not be nil."),
        }
    }
}

impl Error for TaskValidationError {}

/// Construction request for a new task.
///
/// `created_at = None` means "now".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub detail: Option<String>,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub created_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Starts a request with default category and priority.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

/// Canonical task record.
///
/// Fields are private so invariants can only change through validated
/// helpers. Decoding runs the same validation as construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    id: TaskId,
    title: String,
    detail: Option<String>,
    category: TaskCategory,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_at: Option<DateTime<Utc>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a task with default category, priority and no due date.
    pub fn new(title: impl Into<String>) -> TaskResult<Self> {
        Self::create(NewTask::titled(title))
    }

    /// Creates a task with a freshly generated id.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `InvalidDueDate` when `due_at < created_at`.
    pub fn create(request: NewTask) -> TaskResult<Self> {
        Self::build(Uuid::new_v4(), request)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: TaskId, request: NewTask) -> TaskResult<Self> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        Self::build(id, request)
    }

    fn build(id: TaskId, request: NewTask) -> TaskResult<Self> {
        let title = normalize_title(&request.title)?;
        let created_at = request.created_at.unwrap_or_else(Utc::now);
        if let Some(due_at) = request.due_at {
            validate_due(created_at, due_at)?;
        }

        Ok(Self {
            id,
            title,
            detail: normalize_detail(request.detail),
            category: request.category,
            priority: request.priority,
            created_at,
            updated_at: created_at,
            due_at: request.due_at,
            completed: false,
            completed_at: None,
            started_at: None,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn category(&self) -> TaskCategory {
        self.category
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns whether work on this task has started and it is not done.
    pub fn is_in_progress(&self) -> bool {
        self.started_at.is_some() && !self.completed
    }

    /// Returns whether this open task was due before `reference`.
    pub fn is_overdue(&self, reference: DateTime<Utc>) -> bool {
        !self.completed && self.due_at.is_some_and(|due| due < reference)
    }

    /// Renames the task, storing the trimmed title.
    pub fn rename(&mut self, new_title: &str) -> TaskResult<()> {
        self.title = normalize_title(new_title)?;
        self.touch();
        Ok(())
    }

    /// Sets or clears the due date. Clearing is always allowed.
    pub fn reschedule(&mut self, due_at: Option<DateTime<Utc>>) -> TaskResult<()> {
        if let Some(due_at) = due_at {
            validate_due(self.created_at, due_at)?;
        }
        self.due_at = due_at;
        self.touch();
        Ok(())
    }

    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
        self.touch();
    }

    pub fn set_category(&mut self, category: TaskCategory) {
        self.category = category;
        self.touch();
    }

    /// Replaces the detail text; blank text clears it.
    pub fn set_detail(&mut self, detail: Option<String>) {
        self.detail = normalize_detail(detail);
        self.touch();
    }

    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
        self.touch();
    }

    /// Flips completion state and returns the new value.
    pub fn toggle_completion(&mut self) -> bool {
        if self.completed {
            self.mark_incomplete();
        } else {
            self.mark_completed();
        }
        self.completed
    }

    /// Records that work started. Keeps the first start time on repeat calls.
    pub fn mark_in_progress(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.touch();
    }

    pub fn clear_in_progress(&mut self) {
        self.started_at = None;
        self.touch();
    }

    /// Re-checks title and due-date invariants.
    pub fn validate(&self) -> TaskResult<()> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if let Some(due_at) = self.due_at {
            validate_due(self.created_at, due_at)?;
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Checks the `due_at >= created_at` rule.
pub fn validate_due(created_at: DateTime<Utc>, due_at: DateTime<Utc>) -> TaskResult<()> {
    if due_at < created_at {
        return Err(TaskValidationError::InvalidDueDate { created_at, due_at });
    }
    Ok(())
}

fn normalize_title(title: &str) -> TaskResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_detail(detail: Option<String>) -> Option<String> {
    detail.filter(|value| !value.trim().is_empty())
}

/// Wire shape used to validate persisted tasks on decode.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    category: TaskCategory,
    #[serde(default)]
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let completed_at = if record.completed {
            Some(record.completed_at.unwrap_or(record.updated_at))
        } else {
            None
        };
        let task = Self {
            id: record.id,
            title: record.title.trim().to_string(),
            detail: normalize_detail(record.detail),
            category: record.category,
            priority: record.priority,
            created_at: record.created_at,
            updated_at: record.updated_at,
            due_at: record.due_at,
            completed: record.completed,
            completed_at,
            started_at: record.started_at,
        };
        task.validate()?;
        Ok(task)
    }
}
