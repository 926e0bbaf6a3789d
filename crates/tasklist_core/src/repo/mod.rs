//! Repository layer: single owner of the list collection.
//!
//! # Responsibility
//! - Serialize every read and mutation against the canonical collection.
//! - Enforce referential integrity (named lists, task ids) across operations.
//! - Persist the full collection after each effective mutation.
//!
//! # Invariants
//! - List names are unique case-insensitively.
//! - Callers only ever receive snapshot copies, never the live collection.
//! - A failed persist is reported to the caller; the in-memory mutation stays
//!   applied.

use crate::model::task::TaskId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod list_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository integrity and persistence errors.
#[derive(Debug)]
pub enum RepoError {
    ListNotFound(String),
    TaskNotFound(TaskId),
    /// Another list already holds this name (case-insensitive).
    ListNameTaken(String),
    EmptyListName,
    /// A task with this id already exists in the target list.
    DuplicateTask(TaskId),
    /// Mutation applied in memory but the snapshot write failed.
    Persist(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListNotFound(name) => write!(f, "List not found: {name}"),
            Self::TaskNotFound(id) => write!(f, "Task not found: {id}"),
            Self::ListNameTaken(name) => write!(f, "A list named \"{name}\" already exists."),
            Self::EmptyListName => write!(f, "List name cannot be empty."),
            Self::DuplicateTask(id) => write!(f, "Task already exists: {id}"),
            Self::Persist(err) => write!(f, "Changes could not be saved: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Persist(value)
    }
}

impl RepoError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ListNotFound(_) => "list_not_found",
            Self::TaskNotFound(_) => "task_not_found",
            Self::ListNameTaken(_) => "list_name_taken",
            Self::EmptyListName => "empty_list_name",
            Self::DuplicateTask(_) => "duplicate_task",
            Self::Persist(_) => "persist_failed",
        }
    }
}
