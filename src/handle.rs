//! Typed access to one configuration file.
//!
//! A `ConfigFile` ties a `Schema` to a destination and a format, and
//! builds the requests the orchestrator runs:
//!
//! ```no_run
//! use std::sync::Arc;
//! use configurate::{BaseDirectory, ConfigFile, Configurate, KeyringOptions, MemoryStore};
//! use configurate::schema::{Kind, Schema};
//! use configurate::config::Settings;
//!
//! # fn main() -> configurate::Result<()> {
//! let app = Arc::new(Configurate::new(&Settings::default(), Arc::new(MemoryStore::new())));
//! let schema = Schema::builder()
//!     .field("host", Kind::String)
//!     .secret("password", Kind::String, "db-password")
//!     .build()?;
//! let file = ConfigFile::new(app, schema, "app.json", BaseDirectory::AppConfig, configurate::StorageFormat::Json)?;
//! let opts = KeyringOptions::new("app", "default");
//!
//! let locked = file.load()?;
//! let unlocked = file.unlock(&locked, &opts)?;
//! # drop(unlocked);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use zeroize::Zeroizing;

use crate::codec::StorageFormat;
use crate::errors::{ConfigurateError, Result};
use crate::keyring::KeyringOptions;
use crate::location::resolver::validate_component;
use crate::location::BaseDirectory;
use crate::schema::Schema;
use crate::secrets::{LockedDocument, UnlockedDocument};
use crate::store::{ConfigRequest, Configurate};

/// A per-call change to an optional destination component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Override<T> {
    /// Keep the file's own setting.
    #[default]
    Inherit,
    /// Drop the file's setting for this call.
    Clear,
    /// Use this value instead.
    Set(T),
}

impl<T: Clone> Override<T> {
    fn apply(&self, inherited: Option<&T>) -> Option<T> {
        match self {
            Self::Inherit => inherited.cloned(),
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }
}

/// A schema-typed configuration file.
#[derive(Clone)]
pub struct ConfigFile {
    app: Arc<Configurate>,
    schema: Arc<Schema>,
    name: String,
    dir: BaseDirectory,
    format: StorageFormat,
    encryption_key: Option<Zeroizing<String>>,
    dir_name: Option<String>,
    sub_path: Option<String>,
}

impl ConfigFile {
    /// Describe a file.  The name must be a single valid path component.
    pub fn new(
        app: Arc<Configurate>,
        schema: Schema,
        name: &str,
        dir: BaseDirectory,
        format: StorageFormat,
    ) -> Result<Self> {
        validate_component(name, "filename")?;
        Ok(Self {
            app,
            schema: Arc::new(schema),
            name: name.to_string(),
            dir,
            format,
            encryption_key: None,
            dir_name: None,
            sub_path: None,
        })
    }

    /// Encrypt the file with key material `key`.  Binary format only.
    pub fn encryption_key(mut self, key: &str) -> Result<Self> {
        if self.format != StorageFormat::Binary {
            return Err(ConfigurateError::ConfigError(format!(
                "an encryption key requires the binary format, not {}",
                self.format
            )));
        }
        self.encryption_key = Some(Zeroizing::new(key.to_string()));
        Ok(self)
    }

    /// Default `dirName` for every call.
    pub fn dir_name(mut self, dir_name: &str) -> Self {
        self.dir_name = Some(dir_name.to_string());
        self
    }

    /// Default sub-path for every call.
    pub fn sub_path(mut self, path: &str) -> Self {
        self.sub_path = Some(path.to_string());
        self
    }

    /// The same file at a different destination.
    pub fn relocated(&self, dir_name: Override<String>, sub_path: Override<String>) -> Self {
        let mut moved = self.clone();
        moved.dir_name = dir_name.apply(self.dir_name.as_ref());
        moved.sub_path = sub_path.apply(self.sub_path.as_ref());
        moved
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Write a new file.  Secret fields go to the keyring described by `opts`.
    pub fn create(&self, data: &Value, opts: Option<&KeyringOptions>) -> Result<LockedDocument> {
        let req = self.write_request(data, opts)?;
        Ok(self.app.create(&req)?.into_locked())
    }

    /// Overwrite the file.
    pub fn save(&self, data: &Value, opts: Option<&KeyringOptions>) -> Result<LockedDocument> {
        let req = self.write_request(data, opts)?;
        Ok(self.app.save(&req)?.into_locked())
    }

    /// Read the file; secret fields stay `null`.
    pub fn load(&self) -> Result<LockedDocument> {
        Ok(self.app.load(&self.request())?.into_locked())
    }

    /// Read the file and its secrets in one operation.
    pub fn load_unlocked(&self, opts: &KeyringOptions) -> Result<UnlockedDocument> {
        let req = self
            .request()
            .keyring(self.schema.secret_paths(), opts)
            .with_unlock(true);
        self.app.load(&req)?.into_unlocked()
    }

    /// Fetch the secrets of a document loaded earlier.  The file is not re-read.
    pub fn unlock(&self, locked: &LockedDocument, opts: &KeyringOptions) -> Result<UnlockedDocument> {
        self.app
            .unlock_document(locked, self.schema.secret_paths(), opts)
    }

    /// Remove the file, and its secrets when `opts` is given.
    pub fn delete(&self, opts: Option<&KeyringOptions>) -> Result<()> {
        let mut req = self.request();
        if let Some(opts) = opts {
            req = req.keyring(self.schema.secret_paths(), opts);
        }
        self.app.delete(&req)
    }

    fn request(&self) -> ConfigRequest {
        let mut req = ConfigRequest::new(&self.name, self.dir, self.format);
        req.dir_name = self.dir_name.clone();
        req.path = self.sub_path.clone();
        req.encryption_key = self.encryption_key.as_ref().map(|k| k.to_string());
        req
    }

    fn write_request(&self, data: &Value, opts: Option<&KeyringOptions>) -> Result<ConfigRequest> {
        self.schema.check(data)?;
        let req = self.request().data(data.clone());
        match opts {
            Some(opts) => Ok(req.keyring(self.schema.secret_paths(), opts)),
            None if self.schema.has_secrets() => Err(ConfigurateError::ConfigError(
                "schema declares secret fields; keyring options are required to persist it"
                    .into(),
            )),
            None => Ok(req),
        }
    }
}

impl std::fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFile")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .field("format", &self.format)
            .field("encrypted", &self.encryption_key.is_some())
            .field("dir_name", &self.dir_name)
            .field("sub_path", &self.sub_path)
            .finish_non_exhaustive()
    }
}
