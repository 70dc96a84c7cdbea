//! Sealing whole documents with XChaCha20-Poly1305.
//!
//! A sealed document is laid out as `nonce || ciphertext || tag`. The 24-byte
//! nonce is drawn from the OS on every call, and the fixed [`DOCUMENT_AAD`]
//! label is authenticated alongside the text so a blob sealed for another
//! purpose with the same key does not open as a document.

use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng, Payload},
    XChaCha20Poly1305, XNonce,
};

use mapletree_common::{Error, Result};
use crate::keys::DocumentKey;

pub const NONCE_SIZE: usize = 24;
pub const TAG_SIZE: usize = 16;

/// Associated data bound to every sealed document.
pub const DOCUMENT_AAD: &[u8] = b"mapletree/document/v1";

fn cipher(key: &DocumentKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()))
}

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &DocumentKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let payload = Payload {
        msg: plaintext,
        aad: DOCUMENT_AAD,
    };

    let body = cipher(key)
        .encrypt(&nonce, payload)
        .map_err(|_| Error::Crypto("document could not be sealed".to_string()))?;

    let mut sealed = nonce.to_vec();
    sealed.extend(body);
    Ok(sealed)
}

/// Open a blob produced by [`encrypt`].
///
/// # Errors
/// - `Error::Crypto` if the blob is shorter than nonce plus tag
/// - `Error::Crypto` if authentication fails; nothing is decrypted then
pub fn decrypt(key: &DocumentKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::Crypto(format!(
            "sealed document is {} bytes, need at least {}",
            sealed.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }

    let (nonce, body) = sealed.split_at(NONCE_SIZE);
    let payload = Payload {
        msg: body,
        aad: DOCUMENT_AAD,
    };

    cipher(key)
        .decrypt(XNonce::from_slice(nonce), payload)
        .map_err(|_| Error::Crypto("document failed authentication".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key(byte: u8) -> DocumentKey {
        DocumentKey::from_bytes([byte; crate::KEY_LENGTH])
    }

    #[test]
    fn sealed_document_opens() {
        let key = fixed_key(3);
        let text = b"MAPLE\nH A\n    TAG hello\nE\nEOF";

        let sealed = encrypt(&key, text).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + text.len() + TAG_SIZE);
        assert_eq!(decrypt(&key, &sealed).unwrap(), text);
    }

    #[test]
    fn nonce_differs_per_seal() {
        let key = fixed_key(3);
        let first = encrypt(&key, b"MAPLE\nEOF").unwrap();
        let second = encrypt(&key, b"MAPLE\nEOF").unwrap();
        assert_ne!(first[..NONCE_SIZE], second[..NONCE_SIZE]);
    }

    #[test]
    fn other_key_rejected() {
        let sealed = encrypt(&fixed_key(1), b"MAPLE\nEOF").unwrap();
        assert!(matches!(decrypt(&fixed_key(2), &sealed), Err(Error::Crypto(_))));
    }

    #[test]
    fn flipped_bit_rejected() {
        let key = fixed_key(3);
        let mut sealed = encrypt(&key, b"MAPLE\nEOF").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn foreign_associated_data_rejected() {
        let key = fixed_key(3);
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let body = cipher(&key)
            .encrypt(&nonce, Payload { msg: b"MAPLE\nEOF", aad: b"other" })
            .unwrap();
        let mut sealed = nonce.to_vec();
        sealed.extend(body);

        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn short_blob_rejected() {
        let err = decrypt(&fixed_key(3), &[0u8; NONCE_SIZE + TAG_SIZE - 1]).unwrap_err();
        assert!(err.to_string().contains("need at least 40"));
    }

    #[test]
    fn empty_document_seals() {
        let key = fixed_key(3);
        let sealed = encrypt(&key, b"").unwrap();
        assert!(decrypt(&key, &sealed).unwrap().is_empty());
    }
}
