//! Engine options.

use serde::{Deserialize, Serialize};

use mapletree_common::{ConfigError, Result};
use mapletree_crypto::DocumentKey;
use crate::document::DEFAULT_INDENT_WIDTH;

/// Options for opening a [`crate::MapleTree`].
///
/// The key is runtime-only and never serialized; options loaded from JSON
/// that ask for encryption must be given a key with [`TreeOptions::with_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Spaces per nesting level when re-indenting.
    pub indent_width: usize,
    /// Write an empty document if the file does not exist yet.
    pub create_if_missing: bool,
    /// Store the document as one encrypted token.
    pub encrypt: bool,
    /// Key for encrypted documents.
    #[serde(skip)]
    pub key: Option<DocumentKey>,
}

impl TreeOptions {
    /// Defaults: four-space indent, no creation, plaintext.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Create the file with an empty document when it is missing.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Request or disable encryption at rest.
    pub fn encrypted(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Encrypt with `key`.
    pub fn with_key(mut self, key: DocumentKey) -> Self {
        self.encrypt = true;
        self.key = Some(key);
        self
    }

    /// Check the options before any I/O happens.
    ///
    /// # Errors
    /// - `ConfigError::MissingKey` if encryption is requested without a key
    pub fn validate(&self) -> Result<()> {
        if self.encrypt && self.key.is_none() {
            return Err(ConfigError::MissingKey.into());
        }
        Ok(())
    }

    /// Key to use, if encryption is enabled.
    pub fn effective_key(&self) -> Option<&DocumentKey> {
        if self.encrypt {
            self.key.as_ref()
        } else {
            None
        }
    }

    /// Deserialize options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()).into())
    }

    /// Serialize options to JSON (without the key).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Malformed(e.to_string()).into())
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            create_if_missing: false,
            encrypt: false,
            key: None,
        }
    }
}
