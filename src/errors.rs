use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

/// All errors that can occur in Configurate.
#[derive(Debug, Error)]
pub enum ConfigurateError {
    // --- Input validation ---
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // --- Lookup errors ---
    #[error("Not found: {0}")]
    NotFound(String),

    // --- Crypto errors ---
    #[error("Decryption failed: wrong key or format, or corrupted data")]
    DecryptionFailed,

    // --- Credential store errors ---
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigurateError {
    /// Stable, machine-readable tag for this error.
    ///
    /// Used by the call boundary so callers can branch on the kind
    /// without parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "invalid_path",
            Self::ConfigError(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::DecryptionFailed => "decryption",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::KeyringError(_) => "keyring",
            Self::SerializationError(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

impl Serialize for ConfigurateError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("kind", self.kind())?;
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}

/// Convenience type alias for Configurate results.
pub type Result<T> = std::result::Result<T, ConfigurateError>;
