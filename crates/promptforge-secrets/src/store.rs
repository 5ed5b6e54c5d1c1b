//! Secret store.
//!
//! Defines the [`SecretStore`] trait and [`LocalSecretStore`], which encrypts
//! named secrets with a key derived from the device key and keeps them in a
//! [`KeyValueStorage`] namespace, one record per name.
//!
//! Failure contract:
//! - `save_secret` surfaces every failure. A value that cannot be encrypted
//!   is never written in plaintext.
//! - `load_secret` never fails. Missing, unreadable, and undecryptable
//!   records all come back as `None`; the latter two are logged.
//! - `remove_secret` never fails and is idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use promptforge_core::{Config, SecretString};
use tracing::{debug, warn};

use crate::crypto::{self, DerivedKey};
use crate::device_key::{DeviceKeyProvider, StaticDeviceKey, StorageDeviceKey, DEVICE_KEY_SLOT};
use crate::error::{Result, SecretError, StorageError};
use crate::storage::{FileStorage, KeyValueStorage};
use crate::types::DecryptedSecret;

/// Async interface to encrypted secret storage.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Return the device key, provisioning it on first use.
    async fn ensure_device_key(&self) -> Result<String>;

    /// Encrypt `plaintext` into a base64 record.
    async fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a base64 record.
    async fn decrypt(&self, record: &str) -> Result<DecryptedSecret>;

    /// Encrypt `value` and store it under `name`, replacing any prior value.
    async fn save_secret(&self, name: &str, value: &str) -> Result<()>;

    /// Load and decrypt the secret under `name`.
    ///
    /// Returns `None` both when nothing is stored and when the stored record
    /// cannot be decrypted; callers treat either as "not configured".
    async fn load_secret(&self, name: &str) -> Option<DecryptedSecret>;

    /// Delete the secret under `name`. Idempotent.
    async fn remove_secret(&self, name: &str);

    /// Whether a record is stored under `name`. Does not decrypt it.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Names of stored records, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Derived key remembered for the device key it came from.
struct CachedKey {
    device_key: SecretString,
    key: Arc<DerivedKey>,
}

/// Secret store over a key-value namespace.
///
/// The derived key is cached for as long as the provider keeps returning the
/// same device key, and re-derived as soon as it returns a different one.
pub struct LocalSecretStore<S, P> {
    storage: S,
    device_key: P,
    cache: Mutex<Option<CachedKey>>,
}

/// Store type assembled from configuration by [`DefaultSecretStore::open`].
pub type DefaultSecretStore =
    LocalSecretStore<Arc<dyn KeyValueStorage>, Arc<dyn DeviceKeyProvider>>;

impl<S> LocalSecretStore<S, StorageDeviceKey<S>>
where
    S: KeyValueStorage + Clone,
{
    /// Create a store whose device key lives in the same namespace.
    pub fn new(storage: S) -> Self {
        let provider = StorageDeviceKey::new(storage.clone());
        Self::with_provider(storage, provider)
    }
}

impl DefaultSecretStore {
    /// Open the file-backed store described by `config`.
    ///
    /// `PROMPTFORGE_DEVICE_KEY`, when set, pins the device key instead of the
    /// stored one.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config
            .storage_path()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut file = FileStorage::open(path)?;
        if let Some(quota) = config.storage.quota_bytes {
            file = file.with_quota(quota);
        }

        let storage: Arc<dyn KeyValueStorage> = Arc::new(file);
        let provider: Arc<dyn DeviceKeyProvider> = match StaticDeviceKey::from_env()? {
            Some(pinned) => Arc::new(pinned),
            None => Arc::new(StorageDeviceKey::new(storage.clone())),
        };
        Ok(Self::with_provider(storage, provider))
    }
}

impl<S, P> LocalSecretStore<S, P>
where
    S: KeyValueStorage,
    P: DeviceKeyProvider,
{
    /// Create a store with an explicit device key provider.
    pub fn with_provider(storage: S, device_key: P) -> Self {
        Self {
            storage,
            device_key,
            cache: Mutex::new(None),
        }
    }

    /// The underlying storage namespace.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolve the derived key for the current device key.
    fn derived_key(&self) -> Result<Arc<DerivedKey>> {
        let device_key = SecretString::new(self.device_key.ensure_device_key()?);

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.device_key == device_key {
                return Ok(cached.key.clone());
            }
        }

        debug!("deriving record key");
        let key = Arc::new(DerivedKey::derive(device_key.expose_secret()));
        *cache = Some(CachedKey {
            device_key,
            key: key.clone(),
        });
        Ok(key)
    }
}

/// Any non-empty key is a valid secret name except the device key slot.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SecretError::InvalidName(
            "name must not be empty".to_string(),
        ));
    }
    if name == DEVICE_KEY_SLOT {
        return Err(SecretError::InvalidName(format!(
            "{DEVICE_KEY_SLOT} is reserved for the device key"
        )));
    }
    Ok(())
}

#[async_trait]
impl<S, P> SecretStore for LocalSecretStore<S, P>
where
    S: KeyValueStorage,
    P: DeviceKeyProvider,
{
    async fn ensure_device_key(&self) -> Result<String> {
        self.device_key.ensure_device_key()
    }

    async fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.derived_key()?.encrypt(plaintext)
    }

    async fn decrypt(&self, record: &str) -> Result<DecryptedSecret> {
        let plaintext = self.derived_key()?.decrypt(record)?;
        Ok(DecryptedSecret::new(plaintext.as_str()))
    }

    async fn save_secret(&self, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;

        let record = self.encrypt(value).await?;
        debug!(name, "writing secret");
        self.storage.set(name, &record)?;
        Ok(())
    }

    async fn load_secret(&self, name: &str) -> Option<DecryptedSecret> {
        if let Err(e) = validate_name(name) {
            debug!(name, error = %e, "ignoring load of invalid secret name");
            return None;
        }

        let record = match self.storage.get(name) {
            Ok(Some(record)) if !record.is_empty() => record,
            Ok(_) => return None,
            Err(e) => {
                warn!(name, error = %e, "failed to read secret; treating as not configured");
                return None;
            }
        };

        match self.decrypt(&record).await {
            Ok(secret) => {
                debug!(name, "read secret");
                Some(secret)
            }
            Err(e) => {
                warn!(name, error = %e, "failed to decrypt secret; treating as not configured");
                None
            }
        }
    }

    async fn remove_secret(&self, name: &str) {
        if let Err(e) = validate_name(name) {
            debug!(name, error = %e, "ignoring removal of invalid secret name");
            return;
        }

        debug!(name, "deleting secret");
        if let Err(e) = self.storage.remove(name) {
            warn!(name, error = %e, "failed to delete secret");
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        Ok(self.storage.get(name)?.is_some_and(|v| !v.is_empty()))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for key in self.storage.keys()? {
            if validate_name(&key).is_err() {
                continue;
            }
            // The namespace is shared with non-secret application data.
            match self.storage.get(&key)? {
                Some(value) if crypto::is_record_shaped(&value) => names.push(key),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }
}
