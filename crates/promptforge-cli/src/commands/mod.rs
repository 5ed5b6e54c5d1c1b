//! CLI command implementations.

pub mod api;
pub mod config;
pub mod device_key;
pub mod doctor;
pub mod secrets;

use promptforge_core::Config;
use promptforge_secrets::DefaultSecretStore;

/// Open the secret store described by `config`.
pub(crate) fn open_store(config: &Config) -> anyhow::Result<DefaultSecretStore> {
    DefaultSecretStore::open(config)
        .map_err(|e| anyhow::anyhow!("Failed to open secret store: {}", e))
}
