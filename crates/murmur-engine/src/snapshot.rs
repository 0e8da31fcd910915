//! Optional persistence of engine state across restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use murmur_common::{EngineError, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::directory::ChatSession;
use crate::engine::Engine;
use crate::pool::WaitingEntry;
use crate::state::{EngineState, UserStats};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub taken_at: DateTime<Utc>,
    /// In service order.
    pub waiting: Vec<WaitingEntry>,
    pub sessions: Vec<ChatSession>,
    #[serde(default)]
    pub stats: BTreeMap<UserId, UserStats>,
}

pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &Snapshot) -> Result<(), EngineError>;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, EngineError>;
}

/// Pretty-printed JSON file on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EngineError::Snapshot(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| EngineError::Snapshot(format!("failed to serialize: {e}")))?;

        // Write to a sibling and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| EngineError::Snapshot(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            EngineError::Snapshot(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        info!(
            path = %self.path.display(),
            waiting = snapshot.waiting.len(),
            sessions = snapshot.sessions.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, EngineError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(EngineError::Snapshot(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| EngineError::Snapshot(format!("failed to parse snapshot: {e}")))?;
        Ok(Some(snapshot))
    }
}

impl Engine {
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state().read().await;
        Snapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            waiting: state.pool.entries(),
            sessions: state.directory.sessions(),
            stats: state.stats.clone(),
        }
    }

    /// Replace the current state with `snapshot`. On error the current state
    /// is left as it was.
    pub async fn restore(&self, snapshot: Snapshot) -> Result<(), EngineError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let waiting = snapshot.waiting.len();
        let sessions = snapshot.sessions.len();
        let restored = EngineState::from_parts(snapshot.waiting, snapshot.sessions, snapshot.stats)?;

        *self.state().write().await = restored;
        info!(waiting, sessions, "Engine state restored");
        Ok(())
    }
}
