//! List repository with optional disk persistence.
//!
//! # Responsibility
//! - Provide named-list CRUD and task CRUD over the shared collection.
//! - Run all operations one at a time behind an async mutex.
//!
//! # Invariants
//! - The collection is always sorted by name, case-insensitively.
//! - No-op calls (existing list, absent delete, absent task id) do not write.
//! - Log events carry ids and counts only, never list names or titles.

use super::{RepoError, RepoResult};
use crate::model::task::{Task, TaskId};
use crate::model::task_list::{names_collide, sort_lists, TaskList};
use crate::store::{DiskStore, StoreError};
use log::{error, info, warn};
use tokio::sync::Mutex;

/// Single source of truth for lists and tasks.
///
/// Share it between view-models with `Arc<ListRepository>`.
#[derive(Debug)]
pub struct ListRepository {
    lists: Mutex<Vec<TaskList>>,
    store: Option<DiskStore>,
}

impl ListRepository {
    /// Memory-only repository. Seed lists whose names collide ignoring case
    /// are deduplicated, first occurrence wins.
    pub fn in_memory(seed: Vec<TaskList>) -> Self {
        Self {
            lists: Mutex::new(normalize_collection(seed)),
            store: None,
        }
    }

    /// Disk-backed repository.
    ///
    /// Loads the snapshot, or `seed` when the snapshot is missing or
    /// unreadable, then writes the collection once so first-run seeds
    /// become durable. A failed initial write is logged, not fatal.
    pub fn open(store: DiskStore, seed: Vec<TaskList>) -> Self {
        let lists = normalize_collection(store.load_or_default(seed));
        if let Err(err) = store.save(&lists) {
            warn!(
                "event=repo_open module=repo status=degraded error_code={} error={}",
                err.code(),
                err
            );
        } else {
            info!(
                "event=repo_open module=repo status=ok lists={}",
                lists.len()
            );
        }
        Self {
            lists: Mutex::new(lists),
            store: Some(store),
        }
    }

    pub fn store(&self) -> Option<&DiskStore> {
        self.store.as_ref()
    }

    /// Snapshot of every list, sorted by name ignoring case.
    pub async fn fetch_lists(&self) -> Vec<TaskList> {
        self.lists.lock().await.clone()
    }

    /// Creates an empty list unless one with exactly `name` exists.
    ///
    /// # Errors
    /// - `EmptyListName` for blank names.
    /// - `ListNameTaken` when a different list matches ignoring case.
    /// - `Persist` when the snapshot write fails.
    pub async fn ensure_list(&self, name: &str) -> RepoResult<()> {
        if name.trim().is_empty() {
            return Err(RepoError::EmptyListName);
        }

        let mut lists = self.lists.lock().await;
        if lists.iter().any(|list| list.name == name) {
            return Ok(());
        }
        if lists.iter().any(|list| names_collide(&list.name, name)) {
            return Err(RepoError::ListNameTaken(name.to_string()));
        }

        lists.push(TaskList::new(name));
        sort_lists(&mut lists);
        info!(
            "event=list_ensure module=repo status=created lists={}",
            lists.len()
        );
        self.persist(&lists, "list_ensure").await
    }

    /// Removes a list and all its tasks. Absent names are a no-op.
    pub async fn delete_list(&self, name: &str) -> RepoResult<()> {
        let mut lists = self.lists.lock().await;
        let Some(index) = position_of(&lists, name) else {
            return Ok(());
        };

        let removed = lists.remove(index);
        info!(
            "event=list_delete module=repo status=ok cascaded_tasks={}",
            removed.tasks.len()
        );
        self.persist(&lists, "list_delete").await
    }

    /// Renames a list and re-sorts the collection.
    ///
    /// # Errors
    /// - `ListNotFound(old)` when no list is named exactly `old`.
    /// - `EmptyListName` for a blank new name.
    /// - `ListNameTaken(new)` when another list matches `new` ignoring case.
    pub async fn rename_list(&self, old: &str, new: &str) -> RepoResult<()> {
        let mut lists = self.lists.lock().await;
        let index =
            position_of(&lists, old).ok_or_else(|| RepoError::ListNotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if new.trim().is_empty() {
            return Err(RepoError::EmptyListName);
        }
        let taken = lists
            .iter()
            .enumerate()
            .any(|(other, list)| other != index && names_collide(&list.name, new));
        if taken {
            return Err(RepoError::ListNameTaken(new.to_string()));
        }

        lists[index].name = new.to_string();
        sort_lists(&mut lists);
        info!("event=list_rename module=repo status=ok");
        self.persist(&lists, "list_rename").await
    }

    /// Appends `task` to the named list.
    pub async fn add_task(&self, task: Task, list_name: &str) -> RepoResult<()> {
        let mut lists = self.lists.lock().await;
        let list = list_mut(&mut lists, list_name)?;
        if list.contains(task.id()) {
            return Err(RepoError::DuplicateTask(task.id()));
        }

        let task_id = task.id();
        list.add(task);
        info!("event=task_add module=repo status=ok task_id={task_id}");
        self.persist(&lists, "task_add").await
    }

    /// Replaces the task with the same id in the named list.
    pub async fn update_task(&self, task: Task, list_name: &str) -> RepoResult<()> {
        let mut lists = self.lists.lock().await;
        let list = list_mut(&mut lists, list_name)?;
        let task_id = task.id();
        if !list.replace(task) {
            return Err(RepoError::TaskNotFound(task_id));
        }

        info!("event=task_update module=repo status=ok task_id={task_id}");
        self.persist(&lists, "task_update").await
    }

    /// Removes a task by id. Absent ids are a no-op.
    pub async fn remove_task(&self, id: TaskId, list_name: &str) -> RepoResult<()> {
        let mut lists = self.lists.lock().await;
        let list = list_mut(&mut lists, list_name)?;
        if !list.remove(id) {
            return Ok(());
        }

        info!("event=task_remove module=repo status=ok task_id={id}");
        self.persist(&lists, "task_remove").await
    }

    /// Removes a task only while it is still completed.
    ///
    /// Returns `false` when the task is absent or was reopened; nothing is
    /// written in that case. Used by deferred auto-removal so a task marked
    /// incomplete after its timer was armed survives.
    pub async fn remove_completed_task(&self, id: TaskId, list_name: &str) -> RepoResult<bool> {
        let mut lists = self.lists.lock().await;
        let list = list_mut(&mut lists, list_name)?;
        if !list.find(id).is_some_and(Task::is_completed) {
            return Ok(false);
        }

        list.remove(id);
        info!("event=task_remove module=repo status=ok reason=completed task_id={id}");
        self.persist(&lists, "task_remove").await?;
        Ok(true)
    }

    /// Looks up one task without mutating anything.
    pub async fn find_task(&self, id: TaskId, list_name: &str) -> RepoResult<Option<Task>> {
        let lists = self.lists.lock().await;
        let index = position_of(&lists, list_name)
            .ok_or_else(|| RepoError::ListNotFound(list_name.to_string()))?;
        Ok(lists[index].find(id).cloned())
    }

    /// Writes the collection on the blocking pool. Callers hold the
    /// collection lock across the await, so writes land in mutation order.
    async fn persist(&self, lists: &[TaskList], operation: &str) -> RepoResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let snapshot = lists.to_vec();
        let writer = store.clone();
        let result = match tokio::task::spawn_blocking(move || writer.save(&snapshot)).await {
            Ok(result) => result,
            Err(err) => Err(StoreError::WriteFailed {
                path: store.path().to_path_buf(),
                message: err.to_string(),
            }),
        };
        result.map_err(|err| {
            error!(
                "event=repo_persist module=repo status=error operation={operation} error_code={} error={}",
                err.code(),
                err
            );
            RepoError::Persist(err)
        })
    }
}

fn position_of(lists: &[TaskList], name: &str) -> Option<usize> {
    lists.iter().position(|list| list.name == name)
}

fn list_mut<'a>(lists: &'a mut [TaskList], name: &str) -> RepoResult<&'a mut TaskList> {
    lists
        .iter_mut()
        .find(|list| list.name == name)
        .ok_or_else(|| RepoError::ListNotFound(name.to_string()))
}

/// Drops lists whose name collides ignoring case with an earlier one, then
/// sorts. First occurrence wins.
fn normalize_collection(lists: Vec<TaskList>) -> Vec<TaskList> {
    let total = lists.len();
    let mut unique: Vec<TaskList> = Vec::with_capacity(total);
    for list in lists {
        if !unique
            .iter()
            .any(|kept| names_collide(&kept.name, &list.name))
        {
            unique.push(list);
        }
    }
    if unique.len() < total {
        warn!(
            "event=repo_normalize module=repo status=deduplicated dropped_lists={}",
            total - unique.len()
        );
    }
    sort_lists(&mut unique);
    unique
}
