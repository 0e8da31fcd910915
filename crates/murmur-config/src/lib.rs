//! murmur configuration.
//!
//! TOML-based configuration for the relay server and the pairing engine.
//! Every section uses serde defaults, so a partial (or empty) file works.

pub mod paths;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    EngineSection, LogLevel, LoggingConfig, MurmurConfig, PersistenceConfig, ServerConfig,
    TiersConfig,
};
pub use paths::{default_config_path, default_snapshot_path};
pub use toml_loader::{create_default_config, load_default, load_from_path};

use murmur_common::ConfigError;

/// Load and validate config from `path`, or from the platform default
/// location when no path is given.
pub fn load_config(path: Option<&std::path::Path>) -> Result<MurmurConfig, ConfigError> {
    let config = match path {
        Some(p) => load_from_path(p)?,
        None => load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}
