//! TOML configuration for LazyTask front ends.
//!
//! # Invariants
//! - Every section and field has a default; a missing file is not an error.
//! - Sweep interval and lead window are clamped to at least one second.

use crate::logging::default_log_level;
use crate::notify::scheduler::{ReminderSettings, DEFAULT_LEAD_WINDOW, DEFAULT_SWEEP_INTERVAL};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database file used when neither config nor caller name one.
pub const DEFAULT_DB_FILE_NAME: &str = "lazytask.sqlite3";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the task collection.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub sweep_interval_secs: u64,
    pub lead_window_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
            lead_window_secs: DEFAULT_LEAD_WINDOW.as_secs(),
        }
    }
}

impl ReminderConfig {
    pub fn settings(&self) -> ReminderSettings {
        ReminderSettings {
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            lead_window: Duration::from_secs(self.lead_window_secs.max(1)),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl AppConfig {
    /// Loads config from `path`, falling back to defaults when it is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}
