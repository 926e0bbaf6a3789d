//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve persistence location, startup wipe flag, logging and
//!   auto-removal settings.
//! - Keep env parsing out of the repository and view-model layers.
//!
//! # Invariants
//! - Blank values fall back to defaults.
//! - Unparsable numeric values are reported, never silently replaced.

use crate::logging::default_log_level;
use crate::store::{DiskStore, DEFAULT_FILENAME};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PERSISTENCE_FILENAME: &str = "PERSISTENCE_FILENAME";
pub const ENV_WIPE_PERSISTENCE: &str = "WIPE_PERSISTENCE";
pub const ENV_DATA_DIR: &str = "TASKLIST_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKLIST_LOG_DIR";
pub const ENV_AUTO_REMOVE_SECS: &str = "TASKLIST_AUTO_REMOVE_SECS";

pub const APP_DIR_NAME: &str = "TaskManager";
pub const DEFAULT_AUTO_REMOVE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "invalid value `{value}` for {key}: expected whole seconds")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub persistence_filename: String,
    /// Delete the snapshot file before the repository loads.
    pub wipe_on_startup: bool,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// `None` disables auto-removal of completed tasks.
    pub auto_remove_delay: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            persistence_filename: DEFAULT_FILENAME.to_string(),
            wipe_on_startup: false,
            log_level: default_log_level().to_string(),
            auto_remove_delay: Some(DEFAULT_AUTO_REMOVE_DELAY),
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let data_dir = value(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let log_dir = value(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));
        let auto_remove_delay = match value(ENV_AUTO_REMOVE_SECS) {
            None => Some(DEFAULT_AUTO_REMOVE_DELAY),
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::InvalidNumber {
                        key: ENV_AUTO_REMOVE_SECS,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            persistence_filename: value(ENV_PERSISTENCE_FILENAME)
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            wipe_on_startup: value(ENV_WIPE_PERSISTENCE).as_deref() == Some("1"),
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            data_dir,
            log_dir,
            auto_remove_delay,
        })
    }

    pub fn store(&self) -> DiskStore {
        DiskStore::new(&self.persistence_filename, &self.data_dir)
    }
}

/// Per-application data directory.
///
/// `$XDG_DATA_HOME/TaskManager`, else `$HOME/.local/share/TaskManager`,
/// else the system temp directory.
pub fn default_data_dir() -> PathBuf {
    let non_blank = |key: &str| {
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    };

    if let Some(xdg) = non_blank("XDG_DATA_HOME") {
        return xdg.join(APP_DIR_NAME);
    }
    if let Some(home) = non_blank("HOME") {
        return home.join(".local").join("share").join(APP_DIR_NAME);
    }
    std::env::temp_dir().join(APP_DIR_NAME)
}
