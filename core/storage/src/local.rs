//! Local filesystem storage backend.

use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::provider::StorageBackend;
use mapletree_common::{Error, NotFound, Result};

/// Document stored in one local file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so the file is never observed half-written. While a write
/// is in progress an OS advisory lock is held on the sibling `<file>.lock`;
/// a second writer fails with [`Error::Locked`] instead of racing. The lock
/// file itself stays behind and carries no meaning once nobody holds it, so
/// a writer that dies mid-write does not block later ones.
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Create a backend for the file at `path`.
    ///
    /// The file does not have to exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::generic(self.location(), source)
    }

    fn open_lock_file(&self) -> Result<RwLock<File>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;
        Ok(RwLock::new(file))
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl StorageBackend for LocalFile {
    fn name(&self) -> &str {
        "local"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.path.is_file())
    }

    fn read(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => {
                debug!(path = %self.path.display(), size = data.len(), "Read document");
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NotFound::File {
                path: self.location(),
            }
            .into()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let mut lock_file = self.open_lock_file()?;
        let mut held = match lock_file.try_write() {
            Ok(held) => held,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                warn!(path = %self.path.display(), "Document is locked by another writer");
                return Err(Error::Locked(self.location()));
            }
            Err(e) => return Err(self.io_error(e)),
        };
        // Informational only; the OS lock is what excludes other writers.
        if held.set_len(0).is_ok() {
            let _ = writeln!(*held, "{}", std::process::id());
        }

        let mut staged =
            tempfile::NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.io_error(e))?;
        staged.write_all(data).map_err(|e| self.io_error(e))?;
        staged.as_file().sync_all().map_err(|e| self.io_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        debug!(path = %self.path.display(), size = data.len(), "Wrote document");
        Ok(())
    }
}
