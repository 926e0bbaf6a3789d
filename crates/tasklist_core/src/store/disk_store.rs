//! File-backed snapshot store.
//!
//! # Responsibility
//! - Load and atomically save the list collection at one file path.
//! - Emit `store_load` / `store_save` logging events with duration and status.

use super::{StoreError, StoreResult};
use crate::config::default_data_dir;
use crate::model::task_list::TaskList;
use log::{error, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

pub const DEFAULT_FILENAME: &str = "task_lists.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskStore {
    path: PathBuf,
}

impl DiskStore {
    /// Store at `directory/filename`. The directory is created on first save.
    pub fn new(filename: &str, directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(filename),
        }
    }

    /// Store inside the per-application data directory.
    pub fn in_default_dir(filename: &str) -> Self {
        Self::new(filename, default_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes and atomically writes the full collection.
    ///
    /// # Errors
    /// - `EncodeFailed` when serialization fails.
    /// - `WriteFailed` when the directory, temp file, sync or rename fails.
    pub fn save(&self, lists: &[TaskList]) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = encode(lists).and_then(|bytes| self.write_atomically(&bytes));
        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok lists={} duration_ms={}",
                lists.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_save module=store status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    /// Loads the full collection.
    ///
    /// # Errors
    /// - `NotFound` when no snapshot file exists.
    /// - `ReadFailed` on other I/O failures.
    /// - `DecodeFailed` when content is not a valid collection.
    pub fn load(&self) -> StoreResult<Vec<TaskList>> {
        let started_at = Instant::now();
        let result = self.read_and_decode();
        match &result {
            Ok(lists) => info!(
                "event=store_load module=store status=ok lists={} duration_ms={}",
                lists.len(),
                started_at.elapsed().as_millis()
            ),
            Err(StoreError::NotFound(_)) => info!(
                "event=store_load module=store status=not_found duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_load module=store status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    /// Loads the collection, returning `fallback` on any failure.
    ///
    /// Used for first-run seeding and for recovering from corrupted files.
    pub fn load_or_default(&self, fallback: Vec<TaskList>) -> Vec<TaskList> {
        match self.load() {
            Ok(lists) => lists,
            Err(StoreError::NotFound(path)) => {
                info!(
                    "event=store_load module=store status=fallback reason=not_found path={}",
                    path.display()
                );
                fallback
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=fallback error_code={} error={}",
                    err.code(),
                    err
                );
                fallback
            }
        }
    }

    /// Deletes the snapshot file. A missing file is not an error.
    pub fn wipe(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(
                    "event=store_wipe module=store status=ok path={}",
                    self.path.display()
                );
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::WriteFailed {
                path: self.path.clone(),
                message: err.to_string(),
            }),
        }
    }

    fn read_and_decode(&self) -> StoreResult<Vec<TaskList>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(err) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    message: err.to_string(),
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|err| StoreError::DecodeFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    fn write_atomically(&self, bytes: &[u8]) -> StoreResult<()> {
        let write_failed = |err: std::io::Error| StoreError::WriteFailed {
            path: self.path.clone(),
            message: err.to_string(),
        };

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory).map_err(write_failed)?;

        // Temp file lives next to the target so the rename stays on one filesystem.
        let mut temp = NamedTempFile::new_in(&directory).map_err(write_failed)?;
        temp.write_all(bytes).map_err(write_failed)?;
        temp.as_file().sync_all().map_err(write_failed)?;
        temp.persist(&self.path)
            .map_err(|err| write_failed(err.error))?;
        Ok(())
    }
}

/// Pretty JSON with sorted object keys.
///
/// Round-tripping through `serde_json::Value` sorts keys because its map is
/// ordered by key.
fn encode(lists: &[TaskList]) -> StoreResult<Vec<u8>> {
    let value =
        serde_json::to_value(lists).map_err(|err| StoreError::EncodeFailed(err.to_string()))?;
    let mut bytes = serde_json::to_vec_pretty(&value)
        .map_err(|err| StoreError::EncodeFailed(err.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::encode;
    use crate::model::task::{NewTask, Task, TaskPriority};
    use crate::model::task_list::TaskList;

    #[test]
    fn encode_writes_sorted_keys() {
        let task = Task::create(NewTask::titled("Buy milk").priority(TaskPriority::Low)).unwrap();
        let bytes = encode(&[TaskList::with_tasks("Shopping", vec![task])]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let keys = [
            "\"category\"",
            "\"completed\"",
            "\"completedAt\"",
            "\"createdAt\"",
            "\"detail\"",
            "\"dueAt\"",
            "\"id\"",
            "\"priority\"",
            "\"startedAt\"",
            "\"title\"",
            "\"updatedAt\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| text.find(key).unwrap_or_else(|| panic!("missing key {key}")))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(text.find("\"name\"").unwrap() < text.find("\"tasks\"").unwrap());
        assert!(text.contains("\"priority\": \"low\""));
    }
}
