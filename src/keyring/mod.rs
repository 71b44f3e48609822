//! Credential store integration.
//!
//! Secrets are kept in a `CredentialStore` under:
//!   - service = `opts.service`          (e.g. "my-app")
//!   - account = `{opts.account}/{id}`   (e.g. "default/db-password")
//!
//! Secret ids are unique per schema, so several schemas can share one
//! `(service, account)` pair without colliding.  `/` is used as the
//! separator because Windows Credential Manager builds its target name
//! from account and service, and `:` there confuses some backends.
//!
//! Backends:
//! - `OsKeyring`: the platform keyring (feature `keyring-store`):
//!   macOS Keychain, Windows Credential Manager, Linux keyutils
//! - `MemoryStore`: process-local, for headless runs and tests

pub mod bridge;
pub mod memory;
#[cfg(feature = "keyring-store")]
pub mod os;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurateError, Result};

pub use bridge::SecretBridge;
pub use memory::{MemoryStore, StoreCalls};
#[cfg(feature = "keyring-store")]
pub use os::OsKeyring;

/// A place secrets can be stored by `(service, account)`.
///
/// `get` and `delete` report a missing entry as `NotFound`; an
/// inaccessible store is `StoreUnavailable`.
pub trait CredentialStore: Send + Sync {
    fn get(&self, service: &str, account: &str) -> Result<String>;

    /// Store `value`, overwriting any existing entry.
    fn set(&self, service: &str, account: &str, value: &str) -> Result<()>;

    fn delete(&self, service: &str, account: &str) -> Result<()>;
}

/// Where in the credential store a document's secrets go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyringOptions {
    /// Keyring service name (e.g. your app name).
    pub service: String,
    /// Keyring account name (e.g. "default").
    pub account: String,
}

impl KeyringOptions {
    pub fn new(service: &str, account: &str) -> Self {
        Self {
            service: service.to_string(),
            account: account.to_string(),
        }
    }

    /// Reject empty service or account names.
    pub fn validate(&self) -> Result<()> {
        if self.service.is_empty() || self.account.is_empty() {
            return Err(ConfigurateError::ConfigError(
                "keyring service and account must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Account key for one secret: `{account}/{id}`.
    pub fn account_key(&self, id: &str) -> String {
        format!("{}/{}", self.account, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_joins_with_slash() {
        let opts = KeyringOptions::new("app", "default");
        assert_eq!(opts.account_key("db-password"), "default/db-password");
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(KeyringOptions::new("", "a").validate().is_err());
        assert!(KeyringOptions::new("s", "").validate().is_err());
        assert!(KeyringOptions::new("s", "a").validate().is_ok());
    }
}
