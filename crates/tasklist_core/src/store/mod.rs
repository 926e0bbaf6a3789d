//! Whole-collection JSON snapshot storage.
//!
//! # Responsibility
//! - Persist the entire list collection as one JSON document.
//! - Report load/save failures with semantic error kinds.
//!
//! # Invariants
//! - Writes are atomic: a crash mid-save leaves the previous snapshot intact.
//! - Output is pretty-printed with sorted keys and RFC 3339 timestamps.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod disk_store;

pub use disk_store::{DiskStore, DEFAULT_FILENAME};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// No snapshot exists yet at the given path.
    NotFound(PathBuf),
    /// Snapshot exists but could not be read.
    ReadFailed { path: PathBuf, message: String },
    /// Snapshot content does not match the expected shape or invariants.
    DecodeFailed { path: PathBuf, message: String },
    /// Collection could not be serialized.
    EncodeFailed(String),
    /// Atomic write (temp file, sync, rename) failed.
    WriteFailed { path: PathBuf, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "File not found: {}", path.display()),
            Self::ReadFailed { path, message } => {
                write!(f, "Failed to read file {}: {message}", path.display())
            }
            Self::DecodeFailed { path, message } => {
                write!(f, "Failed to decode file {}: {message}", path.display())
            }
            Self::EncodeFailed(message) => write!(f, "Failed to encode content: {message}"),
            Self::WriteFailed { path, message } => {
                write!(f, "Failed to write file {}: {message}", path.display())
            }
        }
    }
}

impl Error for StoreError {}

impl StoreError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ReadFailed { .. } => "read_failed",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::EncodeFailed(_) => "encode_failed",
            Self::WriteFailed { .. } => "write_failed",
        }
    }
}
