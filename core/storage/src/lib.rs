//! Storage backends for MapleTree documents.
//!
//! A document is always read and written as one complete blob; there is no
//! incremental write path. Backends only move bytes, encryption happens in
//! the document engine above them.

pub mod local;
pub mod memory;
pub mod provider;

pub use local::LocalFile;
pub use memory::MemoryStore;
pub use provider::StorageBackend;
