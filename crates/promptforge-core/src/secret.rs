//! Secure string handling with memory protection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of leading characters left visible by [`SecretString::masked`].
const MASK_PREFIX: usize = 3;
/// Number of trailing characters left visible by [`SecretString::masked`].
const MASK_SUFFIX: usize = 4;

/// A string that is zeroed on drop.
///
/// Used for API keys and decrypted secret values so plaintext does not
/// outlive the value that owns it. Debug and Display never print the value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Expose the secret value.
    ///
    /// Use sparingly - only when the actual value is needed.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Render a display-safe hint such as `sk-...c123`.
    ///
    /// Short values are fully masked.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.inner.chars().collect();
        if chars.len() <= MASK_PREFIX + MASK_SUFFIX {
            return "*".repeat(chars.len().max(4));
        }
        let head: String = chars[..MASK_PREFIX].iter().collect();
        let tail: String = chars[chars.len() - MASK_SUFFIX..].iter().collect();
        format!("{head}...{tail}")
    }
}

// Never print secrets
impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for SecretString {}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacted() {
        let secret = SecretString::new("sk-test-123");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("sk-test-123");
        assert_eq!(secret.expose_secret(), "sk-test-123");
        assert!(!secret.is_empty());
        assert!(SecretString::new("").is_empty());
    }

    #[test]
    fn test_secret_string_equality() {
        let a = SecretString::new("secret");
        let b = SecretString::new("secret");
        let c = SecretString::new("different");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_masked() {
        assert_eq!(SecretString::new("sk-test-123").masked(), "sk-...-123");
        assert_eq!(SecretString::new("short").masked(), "*****");
        assert_eq!(SecretString::new("").masked(), "****");
    }

    #[test]
    fn test_masked_multibyte() {
        let secret = SecretString::new("密钥密钥密钥密钥");
        assert_eq!(secret.masked(), "密钥密...密钥密钥");
    }

    #[test]
    fn test_serde_passthrough() {
        let secret = SecretString::new("value");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"value\"");
        let back: SecretString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }
}
