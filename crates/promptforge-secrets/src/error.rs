//! Error types for secret management.

use thiserror::Error;

/// Errors raised by the key-value storage primitive.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Device key error: {0}")]
    DeviceKey(String),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("API address or API key is required")]
    EmptyApiConfig,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
