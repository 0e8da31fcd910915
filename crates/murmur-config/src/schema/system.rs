//! System configuration types: persistence and logging.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Snapshot persistence across restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// Where the JSON snapshot lives. Unset means the platform data dir.
    pub snapshot_path: Option<PathBuf>,
}

impl PersistenceConfig {
    /// Configured path, or `<data dir>/murmur/snapshot.json`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.snapshot_path
            .clone()
            .or_else(crate::paths::default_snapshot_path)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
