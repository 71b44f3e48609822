//! Cryptographic primitives for Configurate.
//!
//! This module provides:
//! - XChaCha20-Poly1305 sealing and opening (`encryption`)
//! - SHA-256 derivation of the cipher key from caller key material (`keys`)

pub mod encryption;
pub mod keys;

pub use encryption::{open, seal, NONCE_LEN, TAG_LEN};
pub use keys::CipherKey;
