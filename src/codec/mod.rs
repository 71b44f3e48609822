//! Document codecs.
//!
//! This module provides:
//! - `StorageFormat`, the caller-declared on-disk format
//! - JSON and YAML text codecs (`text`)
//! - The plain binary codec (`binary`)
//! - `Codec`, which picks one of the four encodings and, for encrypted
//!   binary, seals the plain binary bytes with XChaCha20-Poly1305
//!
//! There is no format auto-detection: the caller says what the bytes are.

pub mod binary;
pub mod text;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{self, CipherKey};
use crate::errors::{ConfigurateError, Result};

/// Supported storage formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    Json,
    Yaml,
    Binary,
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Binary => "binary",
        })
    }
}

/// Encoder/decoder for one storage format.
pub struct Codec {
    format: StorageFormat,
    key: Option<CipherKey>,
    pretty_json: bool,
}

impl Codec {
    /// Build a codec.
    ///
    /// An encryption key is only meaningful for `Binary`; supplying one
    /// with a text format is a `ConfigError`.
    pub fn new(format: StorageFormat, encryption_key: Option<&str>) -> Result<Self> {
        let key = match (format, encryption_key) {
            (StorageFormat::Binary, Some(material)) => Some(CipherKey::derive(material)),
            (_, None) => None,
            (other, Some(_)) => {
                return Err(ConfigurateError::ConfigError(format!(
                    "an encryption key requires the binary format, not {other}"
                )));
            }
        };
        Ok(Self {
            format,
            key,
            pretty_json: true,
        })
    }

    /// Toggle pretty-printing for JSON output.
    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn format(&self) -> StorageFormat {
        self.format
    }

    /// Whether this codec produces encrypted binary.
    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    /// Serialize a document.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match (self.format, &self.key) {
            (StorageFormat::Json, _) => text::encode_json(value, self.pretty_json),
            (StorageFormat::Yaml, _) => text::encode_yaml(value),
            (StorageFormat::Binary, None) => binary::encode(value),
            (StorageFormat::Binary, Some(key)) => {
                let plain = binary::encode(value)?;
                crypto::seal(key, &plain)
            }
        }
    }

    /// Deserialize a document.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        match (self.format, &self.key) {
            (StorageFormat::Json, _) => text::decode_json(bytes),
            (StorageFormat::Yaml, _) => text::decode_yaml(bytes),
            (StorageFormat::Binary, None) => binary::decode(bytes),
            (StorageFormat::Binary, Some(key)) => {
                let plain = crypto::open(key, bytes)?;
                binary::decode(&plain)
            }
        }
    }
}
