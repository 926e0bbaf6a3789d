//! Named task list.
//!
//! # Invariants
//! - Task ids are unique within one list.
//! - Storage order carries no display meaning; see `sorting` for display order.

use crate::model::task::{Task, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Replaces the task with the same id. Returns `false` when absent.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|item| item.id() == task.id()) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with `id`. Returns `false` when absent.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|item| item.id() != id);
        self.tasks.len() != before
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.find(id).is_some()
    }

    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.is_completed())
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.is_completed())
    }

    /// Open tasks whose due date is before `reference`.
    pub fn overdue(&self, reference: DateTime<Utc>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_overdue(reference))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Case-insensitive name equality used for list uniqueness.
pub fn names_collide(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Case-insensitive name ordering; exact name breaks ties for determinism.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Sorts lists alphabetically by name, ignoring case.
pub fn sort_lists(lists: &mut [TaskList]) {
    lists.sort_by(|left, right| compare_names(&left.name, &right.name));
}
