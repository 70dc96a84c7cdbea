//! In-memory storage backend for testing.

use std::sync::{Arc, RwLock};

use crate::provider::StorageBackend;
use mapletree_common::{Error, NotFound, Result};

/// In-memory storage backend.
///
/// Clones share the same buffer, so a test can keep a handle and inspect
/// exactly what the engine persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `data`.
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::new(RwLock::new(Some(data.into()))),
        }
    }

    /// Current contents, if any.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.data.read().ok().and_then(|data| data.clone())
    }
}

fn poisoned() -> Error {
    Error::generic("memory", "storage lock poisoned")
}

impl StorageBackend for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn exists(&self) -> Result<bool> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.is_some())
    }

    fn read(&self) -> Result<Vec<u8>> {
        let data = self.data.read().map_err(|_| poisoned())?;
        data.clone().ok_or_else(|| {
            NotFound::File {
                path: self.location(),
            }
            .into()
        })
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        *data = Some(bytes.to_vec());
        Ok(())
    }
}
