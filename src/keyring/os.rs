//! The platform keyring, via the `keyring` crate.
//!
//! All operations fail gracefully: if the keyring is unavailable (e.g. a
//! headless session with no secret service), the error is returned as
//! `StoreUnavailable` and nothing is retried.

use super::CredentialStore;
use crate::errors::{ConfigurateError, Result};

/// `CredentialStore` backed by the operating system keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyring;

impl OsKeyring {
    pub fn new() -> Self {
        Self
    }
}

fn entry(service: &str, account: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(service, account).map_err(|e| map_err(e, service, account))
}

fn map_err(e: keyring::Error, service: &str, account: &str) -> ConfigurateError {
    match e {
        keyring::Error::NoEntry => {
            ConfigurateError::NotFound(format!("keyring entry {service}/{account}"))
        }
        keyring::Error::NoStorageAccess(inner) | keyring::Error::PlatformFailure(inner) => {
            ConfigurateError::StoreUnavailable(inner.to_string())
        }
        other => ConfigurateError::KeyringError(format!("{service}/{account}: {other}")),
    }
}

impl CredentialStore for OsKeyring {
    fn get(&self, service: &str, account: &str) -> Result<String> {
        entry(service, account)?
            .get_password()
            .map_err(|e| map_err(e, service, account))
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<()> {
        entry(service, account)?
            .set_password(value)
            .map_err(|e| map_err(e, service, account))
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        entry(service, account)?
            .delete_credential()
            .map_err(|e| map_err(e, service, account))
    }
}
