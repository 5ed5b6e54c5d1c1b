//! Device key provisioning.
//!
//! The device key is 32 random bytes, hex-encoded, created the first time
//! anything needs it and stored in the same namespace as the records it
//! protects. It never changes afterwards unless the user explicitly resets
//! it, which makes every existing record undecryptable.
//!
//! Providers are passed to the store explicitly so tests can substitute a
//! fixed key or an in-memory namespace.

use std::sync::Arc;

use parking_lot::Mutex;
use promptforge_core::env;
use promptforge_core::SecretString;
use tracing::{debug, info};

use crate::crypto;
use crate::error::{Result, SecretError};
use crate::storage::KeyValueStorage;

/// Storage key holding the hex-encoded device key.
pub const DEVICE_KEY_SLOT: &str = "promptforge_device_key";

/// Length of a hex-encoded device key.
pub const DEVICE_KEY_HEX_LEN: usize = crypto::KEY_SIZE * 2;

/// Source of the device key.
pub trait DeviceKeyProvider: Send + Sync {
    /// Return the device key, creating and persisting it first if needed.
    fn ensure_device_key(&self) -> Result<String>;
}

impl<T: DeviceKeyProvider + ?Sized> DeviceKeyProvider for Arc<T> {
    fn ensure_device_key(&self) -> Result<String> {
        (**self).ensure_device_key()
    }
}

/// Device key kept in a storage namespace under [`DEVICE_KEY_SLOT`].
///
/// Provisioning is serialized across clones of one provider, so concurrent
/// first uses all observe the same key.
#[derive(Debug, Clone)]
pub struct StorageDeviceKey<S> {
    storage: S,
    provisioning: Arc<Mutex<()>>,
}

impl<S: KeyValueStorage> StorageDeviceKey<S> {
    /// Create a provider backed by `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            provisioning: Arc::new(Mutex::new(())),
        }
    }

    fn stored_key(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(DEVICE_KEY_SLOT)?
            .filter(|existing| !existing.is_empty()))
    }

    /// Delete the stored device key. The next use provisions a new one.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.provisioning.lock();
        self.storage.remove(DEVICE_KEY_SLOT)?;
        info!("device key removed; existing secrets can no longer be decrypted");
        Ok(())
    }
}

impl<S: KeyValueStorage> DeviceKeyProvider for StorageDeviceKey<S> {
    fn ensure_device_key(&self) -> Result<String> {
        if let Some(existing) = self.stored_key()? {
            return Ok(existing);
        }

        let _guard = self.provisioning.lock();
        // Another caller may have provisioned while we waited.
        if let Some(existing) = self.stored_key()? {
            return Ok(existing);
        }

        let key = crypto::generate_device_key()?;
        self.storage.set(DEVICE_KEY_SLOT, &key)?;
        debug!(slot = DEVICE_KEY_SLOT, "provisioned new device key");
        Ok(key)
    }
}

/// A fixed device key, e.g. pinned through `PROMPTFORGE_DEVICE_KEY`.
#[derive(Debug, Clone)]
pub struct StaticDeviceKey {
    key: SecretString,
}

impl StaticDeviceKey {
    /// Use `hex_key` as the device key. It must be 64 hex characters.
    pub fn new(hex_key: &str) -> Result<Self> {
        let hex_key = hex_key.trim();
        let bytes = hex::decode(hex_key)
            .map_err(|e| SecretError::DeviceKey(format!("invalid hex: {e}")))?;
        if bytes.len() != crypto::KEY_SIZE {
            return Err(SecretError::DeviceKey(format!(
                "device key must decode to exactly {} bytes, got {}",
                crypto::KEY_SIZE,
                bytes.len()
            )));
        }
        Ok(Self {
            key: SecretString::new(hex_key.to_ascii_lowercase()),
        })
    }

    /// Read the key from `PROMPTFORGE_DEVICE_KEY`, if set.
    pub fn from_env() -> Result<Option<Self>> {
        match env::get_var(env::vars::DEVICE_KEY) {
            Some(value) => {
                debug!("using device key from environment variable");
                Self::new(&value).map(Some).map_err(|e| {
                    SecretError::DeviceKey(format!("{}: {e}", env::vars::DEVICE_KEY))
                })
            }
            None => Ok(None),
        }
    }
}

impl DeviceKeyProvider for StaticDeviceKey {
    fn ensure_device_key(&self) -> Result<String> {
        Ok(self.key.expose_secret().to_string())
    }
}
