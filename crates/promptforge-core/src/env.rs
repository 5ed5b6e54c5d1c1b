//! Environment variable handling.

use std::env;

/// Well-known environment variable names.
pub mod vars {
    /// Overrides the config file location.
    pub const CONFIG: &str = "PROMPTFORGE_CONFIG";
    /// Overrides the storage namespace file.
    pub const STORAGE: &str = "PROMPTFORGE_STORAGE";
    /// Pins the device key (64 hex chars) instead of reading it from storage.
    pub const DEVICE_KEY: &str = "PROMPTFORGE_DEVICE_KEY";
    /// Switches log output to JSON lines.
    pub const LOG_JSON: &str = "PROMPTFORGE_LOG_JSON";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
