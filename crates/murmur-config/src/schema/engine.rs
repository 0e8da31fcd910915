//! Pairing engine and tier settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Upper bound on any single delivery, in ms (valid range: 100-60000).
    pub delivery_timeout_ms: u32,
    /// Event broadcast buffer (valid range: 16-65536).
    pub event_capacity: u32,
    /// Per-connection outbound queue (valid range: 16-65536).
    pub channel_capacity: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: 5000,
            event_capacity: 256,
            channel_capacity: 256,
        }
    }
}

impl EngineSection {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.delivery_timeout_ms))
    }
}

/// Users served from the priority tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TiersConfig {
    pub priority_users: Vec<String>,
}

impl TiersConfig {
    pub fn is_priority(&self, user_id: &str) -> bool {
        self.priority_users.iter().any(|u| u == user_id)
    }
}
