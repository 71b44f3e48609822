//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 24-byte nonce and
//! prepends it to the ciphertext.  `open` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 24-byte nonce | ciphertext | 16-byte Poly1305 tag ]

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};

use super::keys::CipherKey;
use crate::errors::{ConfigurateError, Result};

/// Size of the XChaCha20 nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`.
///
/// Returns `nonce || ciphertext || tag`.
pub fn seal(key: &CipherKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    // Fresh random nonce on every call; never reused under one key.
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher.encrypt(&nonce, plaintext).map_err(|e| {
        ConfigurateError::SerializationError(format!("encryption failed: {e}"))
    })?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `seal`.
///
/// Any authentication failure, including truncated input, is
/// `DecryptionFailed`.
pub fn open(key: &CipherKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(ConfigurateError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = XNonce::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| ConfigurateError::DecryptionFailed)
}
