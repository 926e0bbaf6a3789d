//! Core domain logic for the task-list manager.
//! This crate is the single source of truth for list/task invariants.

pub mod bootstrap;
pub mod config;
pub mod fixtures;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sorting;
pub mod store;
pub mod view_model;

pub use bootstrap::{bootstrap, App, BootstrapError};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    NewTask, Task, TaskCategory, TaskId, TaskPriority, TaskResult, TaskValidationError,
};
pub use model::task_list::TaskList;
pub use repo::list_repo::ListRepository;
pub use repo::{RepoError, RepoResult};
pub use sorting::strategy::{
    DefaultSorting, SectionGroup, SectionedTasks, SortingStrategy, TaskSection,
};
pub use store::{DiskStore, StoreError, StoreResult};
pub use view_model::list_view_model::{ListsState, TaskListViewModel};
pub use view_model::task_view_model::TaskViewModel;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
