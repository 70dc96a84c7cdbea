//! Common types shared across the MapleTree crates.
//!
//! This module provides the error taxonomy used by every layer of the
//! document engine and the header path type used to address nested sections.

pub mod error;
pub mod types;

pub use error::{ConfigError, Error, FormatError, NotFound, Result};
pub use types::{validate_name, HeaderPath};
