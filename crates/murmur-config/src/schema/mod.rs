//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod engine;
mod server;
mod system;

pub use engine::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MurmurConfig {
    pub server: ServerConfig,
    pub engine: EngineSection,
    pub tiers: TiersConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}
