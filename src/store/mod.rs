//! The operation orchestrator.
//!
//! Every operation validates its whole request before touching the disk
//! or the credential store, then performs exactly one file operation and
//! at most one batched store operation:
//!
//! | op       | file          | store              |
//! |----------|---------------|--------------------|
//! | create   | write         | batch set          |
//! | save     | write         | batch set          |
//! | load     | read          | batch get (unlock) |
//! | delete   | remove        | batch delete       |
//! | unlock   | none          | batch get          |
//!
//! A failure part-way (file written, secrets not stored) is not rolled back.

pub mod file;
pub mod request;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::codec::Codec;
use crate::config::Settings;
use crate::errors::{ConfigurateError, Result};
use crate::keyring::{CredentialStore, KeyringOptions, SecretBridge};
use crate::location::PathResolver;
use crate::secrets::{
    merge, separate, LockedDocument, SecretEntry, SecretPath, UnlockedDocument,
};

pub use request::{ConfigRequest, UnlockRequest};

/// Result of create, save and load.
#[derive(Debug)]
pub enum Outcome {
    Locked(LockedDocument),
    Unlocked(UnlockedDocument),
}

impl Outcome {
    /// The locked form, locking an unlocked document if needed.
    pub fn into_locked(self) -> LockedDocument {
        match self {
            Self::Locked(locked) => locked,
            Self::Unlocked(unlocked) => unlocked.lock(),
        }
    }

    /// The unlocked form.  A locked outcome is a `ConfigError`.
    pub fn into_unlocked(self) -> Result<UnlockedDocument> {
        match self {
            Self::Unlocked(unlocked) => Ok(unlocked),
            Self::Locked(_) => Err(ConfigurateError::ConfigError(
                "the request did not ask for an unlocked document".into(),
            )),
        }
    }

    /// The document as a plain value, secrets included when unlocked.
    pub fn into_value(self) -> Value {
        match self {
            Self::Locked(locked) => locked.into_value(),
            Self::Unlocked(unlocked) => unlocked.into_plaintext(),
        }
    }
}

/// A request that passed validation, ready for I/O.
struct Prepared<'r> {
    path: PathBuf,
    codec: Codec,
    keyring: Option<(&'r KeyringOptions, Vec<SecretPath>)>,
}

/// Runs configuration operations against the filesystem and a credential store.
pub struct Configurate {
    resolver: PathResolver,
    store: Arc<dyn CredentialStore>,
    pretty_json: bool,
}

impl Configurate {
    pub fn new(settings: &Settings, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            resolver: settings.path_resolver(),
            store,
            pretty_json: settings.pretty_json,
        }
    }

    /// Use the operating system keyring as the credential store.
    #[cfg(feature = "keyring-store")]
    pub fn with_os_keyring(settings: &Settings) -> Self {
        Self::new(settings, Arc::new(crate::keyring::OsKeyring::new()))
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Absolute path a request resolves to.
    pub fn resolve(&self, req: &ConfigRequest) -> Result<PathBuf> {
        self.resolver.resolve(
            req.dir,
            req.dir_name.as_deref(),
            req.path.as_deref(),
            &req.name,
        )
    }

    /// Write a new file, moving declared secrets to the store.
    pub fn create(&self, req: &ConfigRequest) -> Result<Outcome> {
        self.write("create", req)
    }

    /// Overwrite a file, moving declared secrets to the store.
    pub fn save(&self, req: &ConfigRequest) -> Result<Outcome> {
        self.write("save", req)
    }

    /// Read a file.  With `with_unlock`, also fetch and merge its secrets.
    pub fn load(&self, req: &ConfigRequest) -> Result<Outcome> {
        let prepared = self.prepare(req)?;
        debug!(name = %req.name, format = %req.format, path = %prepared.path.display(), "load");

        let bytes = file::read(&prepared.path)?;
        let data = prepared.codec.decode(&bytes)?;

        if !req.with_unlock {
            return Ok(Outcome::Locked(LockedDocument::new(data)));
        }
        match prepared.keyring {
            Some((opts, paths)) => {
                let entries = SecretBridge::new(self.store.as_ref(), opts).get_all(&paths)?;
                Ok(Outcome::Unlocked(UnlockedDocument::new(
                    merge(data, &entries),
                    paths,
                )))
            }
            None => Ok(Outcome::Unlocked(UnlockedDocument::new(data, Vec::new()))),
        }
    }

    /// Remove a file and, with keyring options, its stored secrets.
    ///
    /// A missing file and missing store entries are not errors.
    pub fn delete(&self, req: &ConfigRequest) -> Result<()> {
        let prepared = self.prepare(req)?;
        debug!(name = %req.name, path = %prepared.path.display(), "delete");

        let existed = file::remove(&prepared.path)?;
        if !existed {
            debug!(path = %prepared.path.display(), "file was already absent");
        }

        if let Some((opts, paths)) = prepared.keyring {
            let ids: Vec<&str> = paths.iter().map(|p| p.id.as_str()).collect();
            SecretBridge::new(self.store.as_ref(), opts).batch_delete(&ids)?;
        }
        Ok(())
    }

    /// Merge stored secrets into a document the caller holds.  No file is read.
    ///
    /// Fails as a whole if any secret is missing.
    pub fn unlock(&self, req: &UnlockRequest) -> Result<UnlockedDocument> {
        let paths = request::secret_paths(&req.keyring_entries)?;
        self.unlock_value(req.data.clone(), &paths, &req.keyring_options)
    }

    /// `unlock` for a `LockedDocument` returned by an earlier load.
    pub fn unlock_document(
        &self,
        locked: &LockedDocument,
        paths: &[SecretPath],
        opts: &KeyringOptions,
    ) -> Result<UnlockedDocument> {
        self.unlock_value(locked.data().clone(), paths, opts)
    }

    fn unlock_value(
        &self,
        data: Value,
        paths: &[SecretPath],
        opts: &KeyringOptions,
    ) -> Result<UnlockedDocument> {
        opts.validate()?;
        debug!(service = %opts.service, secrets = paths.len(), "unlock");

        let entries = SecretBridge::new(self.store.as_ref(), opts).get_all(paths)?;
        Ok(UnlockedDocument::new(merge(data, &entries), paths.to_vec()))
    }

    fn prepare<'r>(&self, req: &'r ConfigRequest) -> Result<Prepared<'r>> {
        let codec = Codec::new(req.format, req.encryption_key.as_deref())?
            .pretty_json(self.pretty_json);
        let keyring = req.keyring_target()?;
        let path = self.resolve(req)?;
        Ok(Prepared {
            path,
            codec,
            keyring,
        })
    }

    fn write(&self, op: &'static str, req: &ConfigRequest) -> Result<Outcome> {
        let prepared = self.prepare(req)?;
        let data = req
            .data
            .as_ref()
            .ok_or_else(|| ConfigurateError::ConfigError(format!("{op} requires data")))?;
        debug!(
            op,
            name = %req.name,
            format = %req.format,
            encrypted = prepared.codec.is_encrypted(),
            path = %prepared.path.display(),
            "write"
        );

        let (plain, entries, paths) = match &prepared.keyring {
            Some((_, paths)) => {
                let (plain, mut entries) = separate(data, paths);
                let presplit = presplit_entries(req, &entries);
                entries.extend(presplit);
                (plain, entries, paths.clone())
            }
            None => (data.clone(), Vec::new(), Vec::new()),
        };

        let bytes = prepared.codec.encode(&plain)?;
        file::write_atomic(&prepared.path, &bytes)?;

        if let Some((opts, _)) = prepared.keyring {
            SecretBridge::new(self.store.as_ref(), opts).batch_set(&entries)?;
        }

        if req.with_unlock {
            Ok(Outcome::Unlocked(UnlockedDocument::new(
                merge(plain, &entries),
                paths,
            )))
        } else {
            Ok(Outcome::Locked(LockedDocument::new(plain)))
        }
    }
}

/// Request entries that already carry a value and were not found in the
/// document.  The caller separated these itself.
fn presplit_entries(req: &ConfigRequest, found: &[SecretEntry]) -> Vec<SecretEntry> {
    req.keyring_entries
        .iter()
        .flatten()
        .filter(|e| !e.value.is_empty() && !found.iter().any(|f| f.id == e.id))
        .cloned()
        .collect()
}
