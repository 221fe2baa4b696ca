//! Configuration loader for Onigiri.
//!
//! Reads `onigiri.toml` and deserializes it into [`OnigiriConfig`]. Falls
//! back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use onigiri_types::config::OnigiriConfig;

pub const CONFIG_FILE_NAME: &str = "onigiri.toml";

/// `{config_dir}/onigiri/onigiri.toml`, e.g. `~/.config/onigiri/onigiri.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("onigiri").join(CONFIG_FILE_NAME))
}

/// Pick the config file to read.
///
/// Priority: an explicit path, then `./onigiri.toml` if it exists, then the
/// per-user default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    default_config_path()
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`OnigiriConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn load_config(path: &Path) -> OnigiriConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return OnigiriConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return OnigiriConfig::default();
        }
    };

    match toml::from_str::<OnigiriConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            OnigiriConfig::default()
        }
    }
}
