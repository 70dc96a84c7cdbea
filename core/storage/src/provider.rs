//! Storage backend trait definition.

use mapletree_common::Result;

/// Backing store for a single document.
///
/// All operations are synchronous and move the whole document at once.
pub trait StorageBackend: Send + Sync {
    /// Get the backend name (e.g., "local", "memory").
    fn name(&self) -> &str;

    /// Human-readable location used in log lines and error context.
    fn location(&self) -> String;

    /// Check if the document exists.
    fn exists(&self) -> Result<bool>;

    /// Read the complete stored bytes.
    ///
    /// # Errors
    /// - `NotFound::File` if nothing is stored yet
    /// - `Error::Generic` on I/O failure
    fn read(&self) -> Result<Vec<u8>>;

    /// Replace the stored bytes.
    ///
    /// # Postconditions
    /// - Readers observe either the old or the new content, never a mix
    ///
    /// # Errors
    /// - `Error::Locked` if another writer holds the document
    /// - `Error::Generic` on I/O failure
    fn write(&self, data: &[u8]) -> Result<()>;
}
