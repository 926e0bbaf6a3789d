//! Process wiring: config -> store -> repository -> view-models.
//!
//! # Responsibility
//! - Apply the startup wipe flag before the repository loads.
//! - Build one shared repository and both view-models over it.
//!
//! # Invariants
//! - Exactly one repository instance per `App`.
//! - Logging is initialized by the caller, not here.

use crate::config::AppConfig;
use crate::fixtures::make_seed;
use crate::repo::list_repo::ListRepository;
use crate::store::StoreError;
use crate::view_model::list_view_model::TaskListViewModel;
use crate::view_model::task_view_model::TaskViewModel;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum BootstrapError {
    /// Startup wipe was requested but the snapshot could not be deleted.
    Wipe(StoreError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wipe(err) => write!(f, "failed to wipe persistence on startup: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Wipe(err) => Some(err),
        }
    }
}

/// Wired application core handed to the rendering collaborator.
pub struct App {
    pub repo: Arc<ListRepository>,
    pub lists: TaskListViewModel,
    pub tasks: TaskViewModel,
}

/// Builds the app from `config`, seeding fixtures on first run.
pub async fn bootstrap(config: &AppConfig) -> Result<App, BootstrapError> {
    let store = config.store();
    if config.wipe_on_startup {
        store.wipe().map_err(BootstrapError::Wipe)?;
    }

    let repo = Arc::new(ListRepository::open(store, make_seed()));
    let lists = TaskListViewModel::new(Arc::clone(&repo));
    let tasks = TaskViewModel::with_auto_remove_delay(Arc::clone(&repo), config.auto_remove_delay);
    lists.load().await;

    info!(
        "event=bootstrap module=core status=ok wiped={} lists={}",
        config.wipe_on_startup,
        lists.lists().len()
    );
    Ok(App { repo, lists, tasks })
}
