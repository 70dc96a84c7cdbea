//! Document engine for the Maple hierarchical text format.
//!
//! A Maple document is a line-oriented file bounded by `MAPLE` and `EOF`
//! sentinel lines. Sections open with `H <name>` and close with `E`; every
//! other line is a `<tag> <value>` leaf. Indentation is derived from nesting
//! and rewritten on every change.
//!
//! ```text
//! MAPLE
//! H Settings
//!     LEVEL INFO
//!     H Output
//!         PATH /var/log/app
//!     E
//! E
//! EOF
//! ```
//!
//! This module provides:
//! - Parsing and structural validation ([`Document`])
//! - Header path resolution and tag/section access
//! - Optional whole-document encryption at rest
//! - [`MapleTree`], which binds a document to its backing store
//!
//! # Architecture
//! Storage backends move bytes, [`store::DocumentStore`] handles encryption,
//! [`Document`] owns the line model, and [`MapleTree`] serializes access to
//! it behind one lock per instance.

pub mod config;
pub mod document;
mod headers;
pub mod line;
pub mod resolve;
pub mod store;
mod tags;
pub mod tree;

pub use config::TreeOptions;
pub use document::{Document, DEFAULT_INDENT_WIDTH};
pub use line::{Line, LineKind};
pub use resolve::{Resolution, Scope};
pub use store::DocumentStore;
pub use tree::{MapleTree, TreeState};

pub use mapletree_common::{ConfigError, Error, FormatError, HeaderPath, NotFound, Result};
pub use mapletree_crypto::DocumentKey;
pub use mapletree_storage::{LocalFile, MemoryStore, StorageBackend};
