//! Persistence and encryption adapter.
//!
//! Turns stored bytes into document text and back. With a key configured
//! the whole serialized document is sealed into one encrypted token; every
//! save rewrites the full backing store.

use std::sync::Arc;
use tracing::{debug, info, warn};

use mapletree_common::{FormatError, Result};
use mapletree_crypto::{open_token, seal_token, DocumentKey};
use mapletree_storage::StorageBackend;
use crate::document::base_text;

/// Reads and writes document text through a storage backend.
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    key: Option<DocumentKey>,
}

impl DocumentStore {
    /// Create an adapter; `key` enables encryption at rest.
    pub fn new(backend: Arc<dyn StorageBackend>, key: Option<DocumentKey>) -> Self {
        Self { backend, key }
    }

    /// Whether documents are stored encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    /// Name of the backing store kind, e.g. `local`.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Location of the backing store, for messages.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Read and, if configured, decrypt the stored document.
    ///
    /// # Errors
    /// - `NotFound::File` if nothing is stored
    /// - `FormatError::NotThisFormat` if decryption or UTF-8 decoding fails
    pub fn load_text(&self) -> Result<String> {
        let bytes = self.backend.read()?;
        self.decode(bytes)
    }

    /// Encrypt (if configured) and write `text`, replacing what is stored.
    pub fn save_text(&self, text: &str) -> Result<()> {
        let bytes = self.encode(text)?;
        self.backend.write(&bytes)?;
        debug!(
            backend = self.backend_name(),
            location = %self.location(),
            size = bytes.len(),
            encrypted = self.is_encrypted(),
            "Saved document"
        );
        Ok(())
    }

    /// Write the empty skeleton if nothing is stored yet.
    ///
    /// Returns whether a document was created.
    pub fn create_base(&self) -> Result<bool> {
        if self.backend.exists()? {
            return Ok(false);
        }
        self.save_text(&base_text())?;
        info!(
            backend = self.backend_name(),
            location = %self.location(),
            encrypted = self.is_encrypted(),
            "Created document"
        );
        Ok(true)
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match &self.key {
            Some(key) => Ok(seal_token(key, text.as_bytes())?.into_bytes()),
            None => Ok(text.as_bytes().to_vec()),
        }
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<String> {
        let plaintext = match &self.key {
            Some(key) => open_token(key, &bytes).map_err(|e| {
                warn!(location = %self.location(), error = %e, "Could not decrypt document");
                FormatError::NotThisFormat {
                    reason: "encrypted document could not be authenticated",
                }
            })?,
            None => bytes,
        };

        String::from_utf8(plaintext).map_err(|_| {
            FormatError::NotThisFormat {
                reason: "document is not valid UTF-8",
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapletree_common::{Error, NotFound};
    use mapletree_storage::MemoryStore;

    fn store(memory: &MemoryStore, key: Option<DocumentKey>) -> DocumentStore {
        DocumentStore::new(Arc::new(memory.clone()), key)
    }

    #[test]
    fn test_plaintext_roundtrip() {
        let memory = MemoryStore::new();
        let store = store(&memory, None);

        store.save_text("MAPLE\nEOF\n").unwrap();
        assert_eq!(memory.contents().unwrap(), b"MAPLE\nEOF\n");
        assert_eq!(store.load_text().unwrap(), "MAPLE\nEOF\n");
    }

    #[test]
    fn test_encrypted_roundtrip() {
        let memory = MemoryStore::new();
        let key = DocumentKey::generate();
        let store = store(&memory, Some(key));

        store.save_text("MAPLE\nH A\n    T v\nE\nEOF").unwrap();
        let raw = memory.contents().unwrap();
        assert!(!raw.windows(5).any(|w| w == b"MAPLE"));
        assert_eq!(store.load_text().unwrap(), "MAPLE\nH A\n    T v\nE\nEOF");
    }

    #[test]
    fn test_fresh_ciphertext_per_save() {
        let memory = MemoryStore::new();
        let store = store(&memory, Some(DocumentKey::generate()));

        store.save_text("MAPLE\nEOF").unwrap();
        let first = memory.contents().unwrap();
        store.save_text("MAPLE\nEOF").unwrap();
        assert_ne!(first, memory.contents().unwrap());
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let memory = MemoryStore::new();
        store(&memory, Some(DocumentKey::generate()))
            .save_text("MAPLE\nEOF")
            .unwrap();

        let err = store(&memory, Some(DocumentKey::generate()))
            .load_text()
            .unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_plaintext_with_key_fails_closed() {
        let memory = MemoryStore::with_contents("MAPLE\nEOF\n");
        let err = store(&memory, Some(DocumentKey::generate()))
            .load_text()
            .unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_binary_without_key_is_not_this_format() {
        let memory = MemoryStore::with_contents(vec![0xff, 0xfe, 0x00]);
        let err = store(&memory, None).load_text().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidFormat(FormatError::NotThisFormat { .. })
        ));
    }

    #[test]
    fn test_create_base_only_once() {
        let memory = MemoryStore::new();
        let store = store(&memory, None);

        assert!(matches!(
            store.load_text().unwrap_err(),
            Error::NotFound(NotFound::File { .. })
        ));
        assert!(store.create_base().unwrap());
        assert!(!store.create_base().unwrap());
        assert_eq!(store.load_text().unwrap(), "MAPLE\nEOF\n");
    }
}
