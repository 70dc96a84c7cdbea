//! Common error types for MapleTree.
//!
//! Failures form a closed set: lookups that miss ([`NotFound`]), documents
//! that break the structural rules ([`FormatError`]), engine construction
//! problems ([`ConfigError`]) and lower-level faults wrapped with the file
//! they happened on ([`Error::Generic`]).

use thiserror::Error;

/// Boxed source error carried by [`Error::Generic`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn within(header: &Option<String>) -> String {
    match header {
        Some(header) => format!(" in [{}]", header),
        None => String::new(),
    }
}

/// A requested item does not exist.
///
/// Header and tag misses are ordinary outcomes callers branch on. The
/// `parent`/`header` fields hold the last section that did match, so a
/// message can say where the lookup stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    /// The backing file does not exist.
    #[error("Maple file not found: {path}")]
    File { path: String },

    /// A section in a header path is missing.
    #[error("Header [{header}] not found{}", within(.parent))]
    Header {
        header: String,
        parent: Option<String>,
    },

    /// A leaf tag is missing from the resolved section.
    #[error("Tag [{tag}] not found{}", within(.header))]
    Tag { tag: String, header: Option<String> },

    /// A named child (e.g. a section to delete) is missing.
    #[error("Data [{name}] not found{}", within(.header))]
    Data { name: String, header: Option<String> },
}

/// The text is not a well-formed Maple document.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Fewer than two lines of input.
    #[error("Invalid Maple file format: document is empty")]
    Empty,

    /// A section close without a matching open, or an unclosed section.
    #[error("Invalid Maple file format: malformed nesting at line {line}")]
    MalformedNesting { line: usize },

    /// The end sentinel appears inside a section or is followed by structure.
    #[error("Invalid Maple file format: EOF in the middle of the data at line {line}")]
    MisplacedTerminator { line: usize },

    /// The input is not a Maple document at all (or could not be decrypted).
    #[error("The file is not a Maple file: {reason}")]
    NotThisFormat { reason: &'static str },
}

/// The engine was configured inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Encryption was requested without a key.
    #[error("Encryption requested but no key supplied")]
    MissingKey,

    /// A supplied key could not be decoded.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Options could not be parsed.
    #[error("Invalid configuration: {0}")]
    Malformed(String),
}

/// Top-level error type for MapleTree operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File, header, tag or data lookup missed.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// Structural validation failed.
    #[error(transparent)]
    InvalidFormat(#[from] FormatError),

    /// Engine configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A tag, section name or value cannot be stored.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encryption-side cryptographic failure.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Another writer holds the advisory lock for this document.
    #[error("Maple file has been locked by other instance: {0}")]
    Locked(String),

    /// A structural failure made this instance unusable; reload it.
    #[error("Document instance is invalid and must be reloaded")]
    Invalidated,

    /// Lower-level fault with the file it happened on.
    #[error("{context}: {source}")]
    Generic {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Wrap a lower-level fault with context (usually the file location).
    pub fn generic(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Generic {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Whether this is a recoverable header or tag miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is a structural validation failure.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
