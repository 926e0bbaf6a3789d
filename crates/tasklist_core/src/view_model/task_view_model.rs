//! Task-level view-model: task actions plus delayed auto-removal of
//! completed tasks.
//!
//! # Invariants
//! - Every action edits a copy of the task and round-trips it through the
//!   repository.
//! - Completing a task schedules its removal after `auto_remove_delay`;
//!   marking it incomplete cancels that unconditionally.
//! - Completion changes through one view-model run one at a time, so the
//!   last writer decides whether a removal is pending.

use super::removal::RemovalScheduler;
use super::{failure_message, ActionError};
use crate::config::DEFAULT_AUTO_REMOVE_DELAY;
use crate::model::task::{NewTask, Task, TaskCategory, TaskId, TaskPriority};
use crate::repo::list_repo::ListRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

pub struct TaskViewModel {
    repo: Arc<ListRepository>,
    errors: Arc<watch::Sender<Option<String>>>,
    removals: RemovalScheduler,
    auto_remove_delay: Option<Duration>,
    /// Held across update + schedule/cancel so the timer table always
    /// matches the last completion write made through this view-model.
    completion_gate: Mutex<()>,
}

impl TaskViewModel {
    /// View-model with the default 10 second auto-removal delay.
    pub fn new(repo: Arc<ListRepository>) -> Self {
        Self::with_auto_remove_delay(repo, Some(DEFAULT_AUTO_REMOVE_DELAY))
    }

    /// `None` disables auto-removal of completed tasks.
    pub fn with_auto_remove_delay(repo: Arc<ListRepository>, delay: Option<Duration>) -> Self {
        let (errors, _) = watch::channel(None);
        Self {
            repo,
            errors: Arc::new(errors),
            removals: RemovalScheduler::default(),
            auto_remove_delay: delay,
            completion_gate: Mutex::new(()),
        }
    }

    pub fn auto_remove_delay(&self) -> Option<Duration> {
        self.auto_remove_delay
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.errors.send_replace(None);
    }

    /// Receiver notified whenever `last_error` changes, including failures
    /// of background auto-removal.
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.errors.subscribe()
    }

    pub fn has_pending_removal(&self, task_id: TaskId) -> bool {
        self.removals.is_pending(task_id)
    }

    pub fn pending_removals(&self) -> usize {
        self.removals.pending_count()
    }

    /// Builds and stores a new task. Returns its id on success.
    pub async fn add_task(&self, list_name: &str, request: NewTask) -> Option<TaskId> {
        let result = async {
            let task = Task::create(request)?;
            let task_id = task.id();
            self.repo.add_task(task, list_name).await?;
            Ok::<_, ActionError>(task_id)
        }
        .await;
        self.settle("task_add", result)
    }

    pub async fn rename(&self, list_name: &str, task: &Task, new_title: &str) -> bool {
        let mut edited = task.clone();
        let result = match edited.rename(new_title) {
            Ok(()) => self.store_edit(edited, list_name).await,
            Err(err) => Err(err.into()),
        };
        self.settle("task_rename", result).is_some()
    }

    pub async fn reschedule(
        &self,
        list_name: &str,
        task: &Task,
        due_at: Option<DateTime<Utc>>,
    ) -> bool {
        let mut edited = task.clone();
        let result = match edited.reschedule(due_at) {
            Ok(()) => self.store_edit(edited, list_name).await,
            Err(err) => Err(err.into()),
        };
        self.settle("task_reschedule", result).is_some()
    }

    pub async fn set_priority(&self, list_name: &str, task: &Task, priority: TaskPriority) -> bool {
        let mut edited = task.clone();
        edited.set_priority(priority);
        let result = self.store_edit(edited, list_name).await;
        self.settle("task_set_priority", result).is_some()
    }

    pub async fn set_category(&self, list_name: &str, task: &Task, category: TaskCategory) -> bool {
        let mut edited = task.clone();
        edited.set_category(category);
        let result = self.store_edit(edited, list_name).await;
        self.settle("task_set_category", result).is_some()
    }

    pub async fn update_detail(&self, list_name: &str, task: &Task, detail: Option<String>) -> bool {
        let mut edited = task.clone();
        edited.set_detail(detail);
        let result = self.store_edit(edited, list_name).await;
        self.settle("task_update_detail", result).is_some()
    }

    pub async fn mark_in_progress(&self, list_name: &str, task: &Task) -> bool {
        let mut edited = task.clone();
        edited.mark_in_progress();
        let result = self.store_edit(edited, list_name).await;
        self.settle("task_mark_in_progress", result).is_some()
    }

    /// Removes a task now and drops any pending auto-removal for it.
    pub async fn remove(&self, list_name: &str, task_id: TaskId) -> bool {
        self.removals.cancel(task_id);
        let result = self
            .repo
            .remove_task(task_id, list_name)
            .await
            .map_err(ActionError::from);
        self.settle("task_remove", result).is_some()
    }

    /// Marks a task completed and schedules its removal.
    pub async fn mark_completed(&self, list_name: &str, task: &Task) -> bool {
        let _gate = self.completion_gate.lock().await;
        let mut edited = task.clone();
        edited.mark_completed();
        let result = self.store_edit(edited, list_name).await;
        let ok = self.settle("task_mark_completed", result).is_some();
        if ok {
            self.schedule_removal(list_name, task.id());
        }
        ok
    }

    /// Marks a task incomplete. Any pending auto-removal is cancelled first,
    /// whether or not the update succeeds.
    pub async fn mark_incomplete(&self, list_name: &str, task: &Task) -> bool {
        let _gate = self.completion_gate.lock().await;
        self.removals.cancel(task.id());
        let mut edited = task.clone();
        edited.mark_incomplete();
        let result = self.store_edit(edited, list_name).await;
        self.settle("task_mark_incomplete", result).is_some()
    }

    /// Flips completion based on the given task's current state.
    pub async fn toggle_completion(&self, list_name: &str, task: &Task) -> bool {
        if task.is_completed() {
            self.mark_incomplete(list_name, task).await
        } else {
            self.mark_completed(list_name, task).await
        }
    }

    async fn store_edit(&self, edited: Task, list_name: &str) -> Result<(), ActionError> {
        self.repo.update_task(edited, list_name).await?;
        Ok(())
    }

    fn schedule_removal(&self, list_name: &str, task_id: TaskId) {
        let Some(delay) = self.auto_remove_delay else {
            return;
        };
        self.removals.schedule(
            Arc::clone(&self.repo),
            Arc::clone(&self.errors),
            list_name.to_string(),
            task_id,
            delay,
        );
    }

    fn settle<T>(&self, action: &str, result: Result<T, ActionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let message = failure_message(action, &err);
                self.errors.send_replace(Some(message));
                None
            }
        }
    }
}

impl Drop for TaskViewModel {
    fn drop(&mut self) {
        self.removals.cancel_all();
    }
}
