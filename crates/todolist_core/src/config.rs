//! Runtime configuration for front ends.
//!
//! # Responsibility
//! - Hold the storage key, database path, logging and ordering settings.
//! - Read overrides from `TODOLIST_*` environment variables.
//!
//! # Invariants
//! - `storage_key` is never blank.
//! - `log_dir`, when set, is an absolute path.

use crate::logging::{default_log_level, normalize_level};
use crate::model::collection::OrderingPolicy;
use crate::store::normalize_storage_key;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_KEY: &str = "todo_lists";
pub const DEFAULT_DB_FILE_NAME: &str = "todolist.sqlite3";

pub const ENV_STORAGE_KEY: &str = "TODOLIST_STORAGE_KEY";
pub const ENV_DB_PATH: &str = "TODOLIST_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TODOLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TODOLIST_LOG_DIR";
pub const ENV_ORDERING: &str = "TODOLIST_ORDERING";

/// Configuration errors with the offending variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { name: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { name, message } => write!(f, "invalid {name}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage_key: String,
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub ordering: OrderingPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            ordering: OrderingPolicy::Stable,
        }
    }
}

impl AppConfig {
    /// Builds a config from process environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_STORAGE_KEY) {
            config.set_storage_key(&value)?;
        }
        if let Some(value) = lookup(ENV_DB_PATH) {
            config.set_db_path(&value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.set_log_level(&value)?;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.set_log_dir(&value)?;
        }
        if let Some(value) = lookup(ENV_ORDERING) {
            config.ordering =
                value
                    .parse::<OrderingPolicy>()
                    .map_err(|message| ConfigError::Invalid {
                        name: ENV_ORDERING,
                        message,
                    })?;
        }
        Ok(config)
    }

    pub fn set_storage_key(&mut self, value: &str) -> Result<(), ConfigError> {
        self.storage_key = normalize_storage_key(value).map_err(|err| ConfigError::Invalid {
            name: ENV_STORAGE_KEY,
            message: err.to_string(),
        })?;
        Ok(())
    }

    pub fn set_db_path(&mut self, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid {
                name: ENV_DB_PATH,
                message: "path cannot be empty".to_string(),
            });
        }
        self.db_path = PathBuf::from(trimmed);
        Ok(())
    }

    pub fn set_log_level(&mut self, value: &str) -> Result<(), ConfigError> {
        self.log_level = normalize_level(value).map_err(|message| ConfigError::Invalid {
            name: ENV_LOG_LEVEL,
            message,
        })?;
        Ok(())
    }

    pub fn set_log_dir(&mut self, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim();
        if !Path::new(trimmed).is_absolute() {
            return Err(ConfigError::Invalid {
                name: ENV_LOG_DIR,
                message: format!("must be an absolute path, got `{trimmed}`"),
            });
        }
        self.log_dir = Some(PathBuf::from(trimmed));
        Ok(())
    }
}
