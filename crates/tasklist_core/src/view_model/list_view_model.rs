//! List-level view-model: list snapshot plus list CRUD actions.

use super::{failure_message, ActionError};
use crate::model::task_list::TaskList;
use crate::repo::list_repo::ListRepository;
use std::sync::Arc;
use tokio::sync::watch;

/// Published state for list screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListsState {
    /// Snapshot sorted by name, refreshed after every mutating call.
    pub lists: Vec<TaskList>,
    pub last_error: Option<String>,
}

pub struct TaskListViewModel {
    repo: Arc<ListRepository>,
    state: watch::Sender<ListsState>,
}

impl TaskListViewModel {
    pub fn new(repo: Arc<ListRepository>) -> Self {
        let (state, _) = watch::channel(ListsState::default());
        Self { repo, state }
    }

    /// Receiver notified on every snapshot or error change.
    pub fn subscribe(&self) -> watch::Receiver<ListsState> {
        self.state.subscribe()
    }

    pub fn lists(&self) -> Vec<TaskList> {
        self.state.borrow().lists.clone()
    }

    /// Snapshot of one list by exact name.
    pub fn list(&self, name: &str) -> Option<TaskList> {
        self.state
            .borrow()
            .lists
            .iter()
            .find(|list| list.name == name)
            .cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.last_error = None);
    }

    /// Refreshes the snapshot from the repository.
    pub async fn load(&self) {
        let lists = self.repo.fetch_lists().await;
        self.state.send_modify(|state| state.lists = lists);
    }

    /// Creates a list if missing. Returns `false` and records the message on
    /// failure.
    pub async fn ensure_list(&self, name: &str) -> bool {
        self.try_ensure_list(name).await.is_none()
    }

    /// Like `ensure_list`, but also hands the failure message back so a form
    /// can show it inline.
    pub async fn try_ensure_list(&self, name: &str) -> Option<String> {
        let result = self.repo.ensure_list(name.trim()).await;
        self.settle("list_ensure", result.map_err(ActionError::from))
            .await
    }

    pub async fn delete_list(&self, name: &str) -> bool {
        let result = self.repo.delete_list(name.trim()).await;
        self.settle("list_delete", result.map_err(ActionError::from))
            .await
            .is_none()
    }

    /// Renames a list. Both names are trimmed, matching how `ensure_list`
    /// stores them.
    pub async fn rename_list(&self, old: &str, new: &str) -> bool {
        let result = self.repo.rename_list(old.trim(), new.trim()).await;
        self.settle("list_rename", result.map_err(ActionError::from))
            .await
            .is_none()
    }

    /// Refreshes the snapshot and records the failure message, if any.
    ///
    /// Refresh runs on failure too: a persist failure still changed memory.
    async fn settle(&self, action: &str, result: Result<(), ActionError>) -> Option<String> {
        let lists = self.repo.fetch_lists().await;
        let message = result.err().map(|err| failure_message(action, &err));
        self.state.send_modify(|state| {
            state.lists = lists;
            if let Some(message) = &message {
                state.last_error = Some(message.clone());
            }
        });
        message
    }
}
