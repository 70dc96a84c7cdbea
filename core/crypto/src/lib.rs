//! Cryptographic primitives for MapleTree documents.
//!
//! This module provides:
//! - Authenticated encryption using XChaCha20-Poly1305
//! - Document keys with automatic zeroization
//! - A text-safe token wrapping one encrypted document
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Key comparison is constant-time

pub mod aead;
pub mod keys;
pub mod token;

pub use aead::{decrypt, encrypt};
pub use keys::{DocumentKey, KEY_LENGTH};
pub use token::{open_token, seal_token};
