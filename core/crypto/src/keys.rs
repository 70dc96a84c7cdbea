//! Document key with secure memory handling.
//!
//! The key zeroizes its memory on drop to prevent sensitive data from
//! persisting in memory.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chacha20poly1305::{
    aead::{KeyInit, OsRng},
    XChaCha20Poly1305,
};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};
use std::fmt;

use mapletree_common::{ConfigError, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Symmetric key used to seal a whole document at rest.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DocumentKey {
    key: [u8; KEY_LENGTH],
}

impl DocumentKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Create a key from a slice, checking its length.
    ///
    /// # Errors
    /// - Returns error if the slice is not KEY_LENGTH bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            ConfigError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Decode a key from URL-safe base64 text.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut bytes = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Encode the key as URL-safe base64 text.
    ///
    /// # Security
    /// The returned string holds key material; do not log it.
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.key)
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let generated = XChaCha20Poly1305::generate_key(&mut OsRng);
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&generated);
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for DocumentKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for DocumentKey {}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_random() {
        let key1 = DocumentKey::generate();
        let key2 = DocumentKey::generate();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_base64_roundtrip() {
        let key = DocumentKey::generate();
        let restored = DocumentKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(key, restored);
    }

    #[test]
    fn test_invalid_length_rejected() {
        assert!(DocumentKey::from_slice(&[0u8; 16]).is_err());
        assert!(DocumentKey::from_base64("c2hvcnQ=").is_err());
        assert!(DocumentKey::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = DocumentKey::from_bytes([7u8; KEY_LENGTH]);
        assert_eq!(format!("{:?}", key), "DocumentKey([REDACTED])");
    }
}
