//! Requests accepted by the orchestrator.
//!
//! The same shapes travel across the call boundary as camelCase JSON:
//!
//! ```json
//! { "name": "app.json", "dir": "appConfig", "dirName": null, "path": null,
//!   "format": "json", "encryptionKey": null, "data": { ... },
//!   "keyringEntries": [{ "id": "db-password", "dotpath": "password" }],
//!   "keyringOptions": { "service": "app", "account": "default" },
//!   "withUnlock": false }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::codec::StorageFormat;
use crate::errors::{ConfigurateError, Result};
use crate::keyring::KeyringOptions;
use crate::location::BaseDirectory;
use crate::secrets::{SecretEntry, SecretPath};

/// One create / load / save / delete request.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    /// File name, used verbatim (include the extension).
    pub name: String,
    pub dir: BaseDirectory,
    #[serde(default)]
    pub dir_name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    pub format: StorageFormat,
    #[serde(default)]
    pub encryption_key: Option<String>,
    /// Document to persist.  Required by create and save.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub keyring_entries: Option<Vec<SecretEntry>>,
    #[serde(default)]
    pub keyring_options: Option<KeyringOptions>,
    #[serde(default)]
    pub with_unlock: bool,
}

impl ConfigRequest {
    pub fn new(name: &str, dir: BaseDirectory, format: StorageFormat) -> Self {
        Self {
            name: name.to_string(),
            dir,
            dir_name: None,
            path: None,
            format,
            encryption_key: None,
            data: None,
            keyring_entries: None,
            keyring_options: None,
            with_unlock: false,
        }
    }

    pub fn dir_name(mut self, dir_name: &str) -> Self {
        self.dir_name = Some(dir_name.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn encryption_key(mut self, key: &str) -> Self {
        self.encryption_key = Some(key.to_string());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Keep the secrets at `paths` in the credential store described by `opts`.
    pub fn keyring(mut self, paths: &[SecretPath], opts: &KeyringOptions) -> Self {
        self.keyring_entries = Some(paths.iter().map(|p| p.to_entry(String::new())).collect());
        self.keyring_options = Some(opts.clone());
        self
    }

    pub fn with_unlock(mut self, with_unlock: bool) -> Self {
        self.with_unlock = with_unlock;
        self
    }

    /// The keyring half of the request, checked.
    ///
    /// Entries and options must come together; one without the other
    /// would silently write secrets to disk.
    pub(crate) fn keyring_target(&self) -> Result<Option<(&KeyringOptions, Vec<SecretPath>)>> {
        match (&self.keyring_entries, &self.keyring_options) {
            (None, None) => Ok(None),
            (Some(entries), Some(opts)) => {
                opts.validate()?;
                Ok(Some((opts, secret_paths(entries)?)))
            }
            _ => Err(ConfigurateError::ConfigError(
                "keyringEntries and keyringOptions must be provided together".into(),
            )),
        }
    }
}

impl fmt::Debug for ConfigRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRequest")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .field("dir_name", &self.dir_name)
            .field("path", &self.path)
            .field("format", &self.format)
            .field("encrypted", &self.encryption_key.is_some())
            .field("keyring_entries", &self.keyring_entries.as_ref().map(Vec::len))
            .field("keyring_options", &self.keyring_options)
            .field("with_unlock", &self.with_unlock)
            .finish_non_exhaustive()
    }
}

/// Merge stored secrets into a document the caller already holds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest {
    /// The locked document.
    pub data: Value,
    pub keyring_entries: Vec<SecretEntry>,
    pub keyring_options: KeyringOptions,
}

impl UnlockRequest {
    pub fn new(data: Value, paths: &[SecretPath], opts: &KeyringOptions) -> Self {
        Self {
            data,
            keyring_entries: paths.iter().map(|p| p.to_entry(String::new())).collect(),
            keyring_options: opts.clone(),
        }
    }
}

/// Locations of `entries`, rejecting empty and duplicate ids.
pub(crate) fn secret_paths(entries: &[SecretEntry]) -> Result<Vec<SecretPath>> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| {
            if entry.id.is_empty() || entry.dotpath.is_empty() {
                return Err(ConfigurateError::ConfigError(
                    "keyring entries need a non-empty id and dotpath".into(),
                ));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigurateError::ConfigError(format!(
                    "duplicate keyring entry id '{}'",
                    entry.id
                )));
            }
            Ok(entry.path())
        })
        .collect()
}
