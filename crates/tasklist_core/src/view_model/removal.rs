//! Deferred auto-removal jobs keyed by task id.
//!
//! # Invariants
//! - At most one pending job per task id; scheduling replaces and aborts the
//!   previous one.
//! - Cancelling an unknown id is a no-op.
//! - A finished job only clears its own entry (generation match), never a
//!   newer replacement.
//! - A job removes its task only if the stored task is still completed, so a
//!   reopen that races the scheduling call cannot lose the task.

use crate::model::task::TaskId;
use crate::repo::list_repo::ListRepository;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct PendingRemoval {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerTable {
    next_generation: u64,
    pending: HashMap<TaskId, PendingRemoval>,
}

#[derive(Clone, Default)]
pub(crate) struct RemovalScheduler {
    table: Arc<Mutex<TimerTable>>,
}

impl RemovalScheduler {
    /// Schedules removal of `task_id` from `list_name` after `delay`.
    ///
    /// Must be called inside a tokio runtime.
    pub(crate) fn schedule(
        &self,
        repo: Arc<ListRepository>,
        errors: Arc<watch::Sender<Option<String>>>,
        list_name: String,
        task_id: TaskId,
        delay: Duration,
    ) {
        // Lock is held across spawn + insert so a fast job cannot finish
        // before its entry exists.
        let mut table = self.lock();
        if let Some(previous) = table.pending.remove(&task_id) {
            previous.handle.abort();
        }
        table.next_generation += 1;
        let generation = table.next_generation;

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = repo.remove_completed_task(task_id, &list_name).await;
            scheduler.finish(task_id, generation);
            match result {
                Ok(true) => info!(
                    "event=auto_remove module=view_model status=ok task_id={task_id}"
                ),
                Ok(false) => info!(
                    "event=auto_remove module=view_model status=skipped task_id={task_id}"
                ),
                Err(err) => {
                    warn!(
                        "event=auto_remove module=view_model status=error task_id={task_id} error_code={}",
                        err.code()
                    );
                    errors.send_replace(Some(err.to_string()));
                }
            }
        });

        table
            .pending
            .insert(task_id, PendingRemoval { generation, handle });
        info!(
            "event=auto_remove module=view_model status=scheduled task_id={task_id} delay_ms={}",
            delay.as_millis()
        );
    }

    /// Aborts the pending job for `task_id`, if any.
    pub(crate) fn cancel(&self, task_id: TaskId) -> bool {
        let removed = self.lock().pending.remove(&task_id);
        match removed {
            Some(pending) => {
                pending.handle.abort();
                info!("event=auto_remove module=view_model status=cancelled task_id={task_id}");
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_pending(&self, task_id: TaskId) -> bool {
        self.lock().pending.contains_key(&task_id)
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub(crate) fn cancel_all(&self) {
        let mut table = self.lock();
        for (_, pending) in table.pending.drain() {
            pending.handle.abort();
        }
    }

    fn finish(&self, task_id: TaskId, generation: u64) {
        let mut table = self.lock();
        let is_current = table
            .pending
            .get(&task_id)
            .is_some_and(|pending| pending.generation == generation);
        if is_current {
            table.pending.remove(&task_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
