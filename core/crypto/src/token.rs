//! Text token holding one encrypted document.
//!
//! The token is the URL-safe base64 encoding of `nonce || ciphertext || tag`,
//! so an encrypted document is still a single printable line on disk.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};

use mapletree_common::{Error, Result};
use crate::aead::{decrypt, encrypt};
use crate::keys::DocumentKey;

/// Encrypt `plaintext` and encode it as a token.
pub fn seal_token(key: &DocumentKey, plaintext: &[u8]) -> Result<String> {
    let sealed = encrypt(key, plaintext)?;
    Ok(URL_SAFE.encode(sealed))
}

/// Decode and decrypt a token produced by [`seal_token`].
///
/// Surrounding whitespace (such as a trailing newline added by an editor)
/// is ignored.
///
/// # Errors
/// - Returns error if the token is not valid base64
/// - Returns error if authentication fails
pub fn open_token(key: &DocumentKey, token: &[u8]) -> Result<Vec<u8>> {
    let sealed = URL_SAFE
        .decode(token.trim_ascii())
        .map_err(|e| Error::Crypto(format!("Malformed token: {}", e)))?;
    decrypt(key, &sealed)
}
