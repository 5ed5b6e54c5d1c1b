//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the PromptForge base directory (~/.promptforge).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".promptforge"))
}

/// Get the main config file path (~/.promptforge/promptforge.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("promptforge.json5"))
}

/// Get the local storage namespace file (~/.promptforge/local-storage.json).
///
/// This single file plays the role of one origin's key-value storage: the
/// device key and every encrypted record live side by side in it.
pub fn storage_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("local-storage.json"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
