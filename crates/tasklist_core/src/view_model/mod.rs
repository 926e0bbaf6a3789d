//! View-models adapting repository state for a rendering collaborator.
//!
//! # Responsibility
//! - Validate user actions on copies of domain values, then delegate to the
//!   repository.
//! - Publish read-only snapshots and a single `last_error` message through
//!   `tokio::sync::watch` channels.
//!
//! # Invariants
//! - View-models never mutate the canonical collection directly.
//! - Each failure overwrites the previous `last_error`; there is no history.
//! - Raw domain errors never cross this boundary, only their messages.

use crate::model::task::TaskValidationError;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod list_view_model;
mod removal;
pub mod task_view_model;

/// Failure of one view-model action before it is rendered to a message.
#[derive(Debug)]
pub(crate) enum ActionError {
    Validation(TaskValidationError),
    Repo(RepoError),
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ActionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ActionError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ActionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl ActionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(TaskValidationError::EmptyTitle) => "empty_title",
            Self::Validation(TaskValidationError::InvalidDueDate { .. }) => "invalid_due_date",
            Self::Validation(TaskValidationError::NilId) => "nil_id",
            Self::Repo(err) => err.code(),
        }
    }
}

/// Logs a failed action and returns the user-facing message.
pub(crate) fn failure_message(action: &str, err: &ActionError) -> String {
    warn!(
        "event=vm_action module=view_model status=error action={action} error_code={}",
        err.code()
    );
    err.to_string()
}
