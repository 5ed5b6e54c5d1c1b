//! Device-keyed encrypted secret storage for PromptForge.
//!
//! Secrets are encrypted with AES-256-GCM under a key derived (PBKDF2-SHA256)
//! from a random per-device key. The device key and the encrypted records
//! share one key-value storage namespace.

pub mod api_config;
pub mod crypto;
pub mod device_key;
pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use api_config::{ApiConfig, ApiConfigEvent, ApiConfigManager, API_KEY_SECRET, API_URL_SECRET};
pub use device_key::{DeviceKeyProvider, StaticDeviceKey, StorageDeviceKey, DEVICE_KEY_SLOT};
pub use error::{Result, SecretError, StorageError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{DefaultSecretStore, LocalSecretStore, SecretStore};
pub use types::DecryptedSecret;
