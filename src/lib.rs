//! Schema-driven configuration files whose secret fields live in the OS
//! keyring instead of on disk.

pub mod codec;
pub mod commands;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handle;
pub mod keyring;
pub mod location;
pub mod schema;
pub mod secrets;
pub mod store;

pub use codec::StorageFormat;
pub use errors::{ConfigurateError, Result};
pub use handle::{ConfigFile, Override};
pub use keyring::{CredentialStore, KeyringOptions, MemoryStore};
pub use location::BaseDirectory;
pub use secrets::{LockedDocument, UnlockedDocument};
pub use store::{ConfigRequest, Configurate, Outcome, UnlockRequest};
