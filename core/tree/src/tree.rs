//! The MapleTree engine: one document bound to one backing store.
//!
//! Every mutation runs under the instance mutex together with its
//! re-validation, so no caller can observe line indices from before a
//! structural change. Cross-process safety is limited to the advisory lock
//! the local backend takes while flushing; callers must not point two
//! writers at the same file without it.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

use mapletree_common::{Error, HeaderPath, Result};
use mapletree_storage::{LocalFile, StorageBackend};
use crate::config::TreeOptions;
use crate::document::Document;
use crate::store::DocumentStore;

/// Lifecycle of a [`MapleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    Uninitialized,
    Loading,
    Validating,
    Ready,
    Mutating,
    /// A structural failure; the instance must be discarded and reopened.
    Invalid,
}

struct Inner {
    document: Document,
    state: TreeState,
}

/// Maple document opened from a backing store.
pub struct MapleTree {
    store: DocumentStore,
    inner: Mutex<Inner>,
}

fn advance(location: &str, from: TreeState, to: TreeState) -> TreeState {
    debug!(location, ?from, ?to, "State transition");
    to
}

impl MapleTree {
    /// Open the Maple file at `path`.
    ///
    /// # Errors
    /// - `ConfigError::MissingKey` before any I/O if encryption lacks a key
    /// - `NotFound::File` if the file is missing and creation is off
    /// - `FormatError` variants if the content is not a valid document
    pub fn open(path: impl AsRef<Path>, options: TreeOptions) -> Result<Self> {
        options.validate()?;
        Self::with_backend(Arc::new(LocalFile::new(path)), options)
    }

    /// Open a document stored in an arbitrary backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>, options: TreeOptions) -> Result<Self> {
        options.validate()?;

        let store = DocumentStore::new(backend, options.effective_key().cloned());
        let location = store.location();
        let mut state = TreeState::Uninitialized;

        if options.create_if_missing {
            store.create_base()?;
        }

        state = advance(&location, state, TreeState::Loading);
        let text = store.load_text()?;

        state = advance(&location, state, TreeState::Validating);
        let document = Document::parse_with_indent(&text, options.indent_width).map_err(|e| {
            error!(location = %location, error = %e, "Document failed validation");
            e
        })?;

        state = advance(&location, state, TreeState::Ready);
        info!(
            backend = store.backend_name(),
            location = %location,
            lines = document.len(),
            encrypted = store.is_encrypted(),
            "Opened document"
        );

        Ok(Self {
            store,
            inner: Mutex::new(Inner { document, state }),
        })
    }

    /// Location of the backing store.
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Whether the document is stored encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.store.is_encrypted()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TreeState {
        match self.inner.lock() {
            Ok(inner) => inner.state,
            Err(_) => TreeState::Invalid,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.inner.lock().map_err(|_| Error::Invalidated)?;
        if inner.state == TreeState::Invalid {
            return Err(Error::Invalidated);
        }
        Ok(inner)
    }

    fn query<T>(&self, op: impl FnOnce(&Document) -> Result<T>) -> Result<T> {
        let inner = self.lock()?;
        op(&inner.document)
    }

    fn mutate<T>(&self, persist: bool, op: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut inner = self.lock()?;
        let location = self.location();
        inner.state = advance(&location, inner.state, TreeState::Mutating);

        match op(&mut inner.document) {
            Ok(out) => {
                inner.state = advance(&location, inner.state, TreeState::Ready);
                if persist {
                    self.store.save_text(&inner.document.to_text())?;
                    info!(location = %location, "Persisted document");
                }
                Ok(out)
            }
            Err(e) if e.is_invalid_format() => {
                error!(location = %location, error = %e, "Document invalidated by mutation");
                inner.state = advance(&location, inner.state, TreeState::Invalid);
                Err(e)
            }
            Err(e) => {
                inner.state = advance(&location, inner.state, TreeState::Ready);
                Err(e)
            }
        }
    }

    /// Value of `tag` in the section at `path`.
    pub fn read_tag(&self, path: &HeaderPath, tag: &str) -> Result<String> {
        self.query(|doc| doc.read_tag(path, tag))
    }

    /// Set `tag` to `value`, creating missing sections; flush if `persist`.
    pub fn write_tag(&self, path: &HeaderPath, tag: &str, value: &str, persist: bool) -> Result<()> {
        self.mutate(persist, |doc| doc.write_tag(path, tag, value))
    }

    /// Remove `tag` from the section at `path`; flush if `persist`.
    pub fn delete_tag(&self, path: &HeaderPath, tag: &str, persist: bool) -> Result<()> {
        self.mutate(persist, |doc| doc.delete_tag(path, tag))
    }

    /// Names of sections directly inside `path`.
    pub fn headers(&self, path: &HeaderPath) -> Result<Vec<String>> {
        self.query(|doc| doc.headers(path))
    }

    /// Tags directly inside `path`.
    pub fn tags(&self, path: &HeaderPath) -> Result<Vec<String>> {
        self.query(|doc| doc.tags(path))
    }

    /// `(tag, value)` pairs directly inside `path`.
    pub fn tag_entries(&self, path: &HeaderPath) -> Result<Vec<(String, String)>> {
        self.query(|doc| doc.tag_entries(path))
    }

    /// Whether every section of `path` exists.
    pub fn has_header(&self, path: &HeaderPath) -> Result<bool> {
        self.query(|doc| Ok(doc.resolve_header_path(path)?.found))
    }

    /// Whether `tag` exists in the section at `path`.
    pub fn has_tag(&self, path: &HeaderPath, tag: &str) -> Result<bool> {
        match self.read_tag(path, tag) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create the sections of `path` that are missing; flush if `persist`.
    pub fn create_header(&self, path: &HeaderPath, persist: bool) -> Result<bool> {
        self.mutate(persist, |doc| doc.create_header(path))
    }

    /// Remove section `name` under `path` with its whole subtree; flush if
    /// `persist`. Returns the number of lines removed.
    pub fn delete_header(&self, path: &HeaderPath, name: &str, persist: bool) -> Result<usize> {
        self.mutate(persist, |doc| doc.delete_header(path, name))
    }

    /// Flush the current document to the backing store.
    pub fn save(&self) -> Result<()> {
        let inner = self.lock()?;
        self.store.save_text(&inner.document.to_text())?;
        info!(location = %self.location(), "Persisted document");
        Ok(())
    }

    /// Serialized document as it would be saved (before encryption).
    pub fn to_text(&self) -> Result<String> {
        self.query(|doc| Ok(doc.to_text()))
    }

    /// Copy of the in-memory document.
    pub fn snapshot(&self) -> Result<Document> {
        self.query(|doc| Ok(doc.clone()))
    }
}
