//! Core TOML config loading: read from path or platform default.

use crate::schema::MurmurConfig;
use murmur_common::ConfigError;
use std::path::Path;
use tracing::info;

use super::template::default_config_toml;
use crate::paths::default_config_path;

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. Validation is left to the caller.
pub fn load_from_path(path: &Path) -> Result<MurmurConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };

    let config: MurmurConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/murmur/config.toml`
///
/// If the file does not exist, writes a commented default and returns defaults.
pub fn load_default() -> Result<MurmurConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(MurmurConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Write the commented default config to `path`, creating parent dirs.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config_toml())
    };
    write().map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!(path = %path.display(), "Created default config");
    Ok(())
}
