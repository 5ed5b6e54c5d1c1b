//! AES-256-GCM encryption with PBKDF2-HMAC-SHA256 key derivation.
//!
//! The cipher key is derived from the device key:
//!
//! ```text
//! key = PBKDF2-HMAC-SHA256(
//!     password   = "<device key hex>-" + APP_SALT,
//!     salt       = APP_SALT,
//!     iterations = 100_000,
//!     length     = 32,
//! )
//! ```
//!
//! A record is `base64(nonce[12] || ciphertext || tag[16])`, with a fresh
//! random nonce per encryption.
//!
//! `APP_SALT` is one constant shared by every installation, so derivation
//! adds work but no secrecy beyond the device key itself. The constant is
//! kept because changing it would orphan every stored record.

use std::fmt;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};

/// Application-wide salt mixed into key derivation.
pub const APP_SALT: &str = "promptforge-encryption-salt-v1";

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// AES-GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Derived key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Smallest decodable record: a nonce plus at least one byte.
const MIN_RECORD_SIZE: usize = NONCE_SIZE + 1;

/// A 256-bit AES-GCM key derived from a device key.
///
/// The key bytes are zeroed on drop and never leave this type; the only
/// capabilities are [`DerivedKey::encrypt`] and [`DerivedKey::decrypt`].
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl DerivedKey {
    /// Derive the record key for `device_key`. Deterministic.
    pub fn derive(device_key: &str) -> Self {
        let material = Zeroizing::new(format!("{device_key}-{APP_SALT}"));
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        pbkdf2_hmac::<Sha256>(
            material.as_bytes(),
            APP_SALT.as_bytes(),
            PBKDF2_ITERATIONS,
            key.as_mut_slice(),
        );
        Self { key }
    }

    /// Encrypt `plaintext` into a base64 record.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| SecretError::EncryptionFailed(format!("nonce generation failed: {e}")))?;

        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice())
            .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

        let mut record = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        record.extend_from_slice(&nonce_bytes);
        record.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(&record))
    }

    /// Decrypt a base64 record produced by [`DerivedKey::encrypt`].
    ///
    /// Fails closed: malformed input, a wrong key, or any modified byte
    /// yields [`SecretError::DecryptionFailed`] and no plaintext.
    pub fn decrypt(&self, record: &str) -> Result<Zeroizing<String>> {
        let bytes = BASE64
            .decode(record.trim())
            .map_err(|e| SecretError::DecryptionFailed(format!("base64 decode failed: {e}")))?;
        if bytes.len() < MIN_RECORD_SIZE {
            return Err(SecretError::DecryptionFailed(format!(
                "record too short: {} bytes",
                bytes.len()
            )));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice())
            .map_err(|e| SecretError::DecryptionFailed(e.to_string()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| SecretError::DecryptionFailed("authentication failed".to_string()))?;

        String::from_utf8(plaintext)
            .map(Zeroizing::new)
            .map_err(|e| SecretError::DecryptionFailed(format!("invalid UTF-8: {e}")))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Whether `value` has the shape of an encrypted record (base64 of at least
/// a nonce and a tag). Says nothing about whether it decrypts.
pub fn is_record_shaped(value: &str) -> bool {
    BASE64
        .decode(value.trim())
        .map(|bytes| bytes.len() >= NONCE_SIZE + TAG_SIZE)
        .unwrap_or(false)
}

/// Generate 32 random bytes and hex-encode them (64 lowercase chars).
pub fn generate_device_key() -> Result<String> {
    let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
    OsRng
        .try_fill_bytes(bytes.as_mut_slice())
        .map_err(|e| SecretError::DeviceKey(format!("random source unavailable: {e}")))?;
    Ok(hex::encode(bytes.as_slice()))
}
