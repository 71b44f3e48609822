//! Cipher key derivation.
//!
//! The caller supplies arbitrary key material (typically a random string
//! kept in the OS keyring); the 32-byte cipher key is `SHA-256(material)`.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the cipher key (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte cipher key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    bytes: [u8; KEY_LEN],
}

impl CipherKey {
    /// Derive the cipher key from caller-supplied key material.
    pub fn derive(material: &str) -> Self {
        let mut digest = Sha256::digest(material.as_bytes());
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&digest);
        digest.as_mut_slice().zeroize();
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}
