//! Task and list domain model.
//!
//! # Responsibility
//! - Define the canonical task/list records owned by the repository.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - A task title is never blank and is stored trimmed.
//! - `due_at`, when set, is never earlier than `created_at`.

pub mod task;
pub mod task_list;
