//! Where murmur keeps its files: config under the platform config dir,
//! snapshots under the platform data dir.

use std::path::PathBuf;

use murmur_common::ConfigError;

const APP_DIR: &str = "murmur";
const CONFIG_FILE: &str = "config.toml";
const SNAPSHOT_FILE: &str = "snapshot.json";

/// `<config dir>/murmur/config.toml`, e.g. `~/.config/murmur/config.toml` on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    in_app_dir(dirs::config_dir(), CONFIG_FILE)
        .ok_or_else(|| ConfigError::FileNotFound(PathBuf::from(CONFIG_FILE)))
}

/// `<data dir>/murmur/snapshot.json`, or `None` on platforms without a data dir.
pub fn default_snapshot_path() -> Option<PathBuf> {
    in_app_dir(dirs::data_dir(), SNAPSHOT_FILE)
}

fn in_app_dir(base: Option<PathBuf>, file: &str) -> Option<PathBuf> {
    base.map(|dir| dir.join(APP_DIR).join(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_share_the_app_dir() {
        let base = PathBuf::from("/base");
        assert_eq!(
            in_app_dir(Some(base.clone()), CONFIG_FILE),
            Some(PathBuf::from("/base/murmur/config.toml"))
        );
        assert_eq!(
            in_app_dir(Some(base), SNAPSHOT_FILE),
            Some(PathBuf::from("/base/murmur/snapshot.json"))
        );
        assert_eq!(in_app_dir(None, CONFIG_FILE), None);
    }

    #[test]
    fn default_paths_end_in_murmur_files() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("murmur/config.toml"));
        }
        if let Some(path) = default_snapshot_path() {
            assert!(path.ends_with("murmur/snapshot.json"));
        }
    }
}
