//! Batch access to a document's secrets.

use tracing::{debug, warn};

use super::{CredentialStore, KeyringOptions};
use crate::errors::{ConfigurateError, Result};
use crate::secrets::{SecretEntry, SecretPath};

/// Reads, writes, and removes the secrets of one document.
///
/// Calls are issued one at a time in the order given.  Values are never
/// logged; only ids and account keys are.
pub struct SecretBridge<'a> {
    store: &'a dyn CredentialStore,
    opts: &'a KeyringOptions,
}

impl<'a> SecretBridge<'a> {
    pub fn new(store: &'a dyn CredentialStore, opts: &'a KeyringOptions) -> Self {
        Self { store, opts }
    }

    /// Fetch every path, returning one result per path in input order.
    /// A failed lookup does not stop the others.
    pub fn batch_get(&self, paths: &[SecretPath]) -> Vec<Result<SecretEntry>> {
        paths
            .iter()
            .map(|path| {
                let account = self.opts.account_key(&path.id);
                debug!(service = %self.opts.service, %account, "keyring get");
                self.store
                    .get(&self.opts.service, &account)
                    .map(|value| path.to_entry(value))
            })
            .collect()
    }

    /// Fetch every path, failing if any one of them fails.
    ///
    /// All lookups are attempted; the first error in input order is
    /// returned.
    pub fn get_all(&self, paths: &[SecretPath]) -> Result<Vec<SecretEntry>> {
        self.batch_get(paths).into_iter().collect()
    }

    /// Store every entry, overwriting existing values.
    ///
    /// Stops at the first failure.  Entries written before it stay written.
    pub fn batch_set(&self, entries: &[SecretEntry]) -> Result<()> {
        for entry in entries {
            let account = self.opts.account_key(&entry.id);
            debug!(service = %self.opts.service, %account, "keyring set");
            self.store
                .set(&self.opts.service, &account, &entry.value)
                .map_err(|e| {
                    warn!(%account, "keyring set failed: {e}");
                    e
                })?;
        }
        Ok(())
    }

    /// Remove every id.  Missing entries are not an error.
    ///
    /// All ids are attempted; the first other failure is returned after
    /// the loop.
    pub fn batch_delete(&self, ids: &[&str]) -> Result<()> {
        let mut first_err: Option<ConfigurateError> = None;
        for id in ids {
            let account = self.opts.account_key(id);
            debug!(service = %self.opts.service, %account, "keyring delete");
            match self.store.delete(&self.opts.service, &account) {
                Ok(()) | Err(ConfigurateError::NotFound(_)) => {}
                Err(e) => {
                    warn!(%account, "keyring delete failed: {e}");
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::MemoryStore;

    fn opts() -> KeyringOptions {
        KeyringOptions::new("app", "default")
    }

    #[test]
    fn set_then_get_uses_account_keys() {
        let store = MemoryStore::new();
        let opts = opts();
        let bridge = SecretBridge::new(&store, &opts);

        let entry = SecretPath::new("db-password", "db.password").to_entry("pw".into());
        bridge.batch_set(&[entry]).unwrap();

        assert_eq!(store.get("app", "default/db-password").unwrap(), "pw");
        let got = bridge
            .get_all(&[SecretPath::new("db-password", "db.password")])
            .unwrap();
        assert_eq!(got[0].value, "pw");
        assert_eq!(got[0].dotpath, "db.password");
    }

    #[test]
    fn batch_get_reports_each_path() {
        let store = MemoryStore::new();
        store.set("app", "default/a", "1").unwrap();
        let opts = opts();
        let bridge = SecretBridge::new(&store, &opts);

        let results = bridge.batch_get(&[SecretPath::new("a", "a"), SecretPath::new("b", "b")]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ConfigurateError::NotFound(_))));
        assert_eq!(store.calls().get, 2);
    }

    #[test]
    fn get_all_fails_when_one_is_missing() {
        let store = MemoryStore::new();
        store.set("app", "default/a", "1").unwrap();
        let opts = opts();
        let bridge = SecretBridge::new(&store, &opts);

        let err = bridge
            .get_all(&[SecretPath::new("a", "a"), SecretPath::new("b", "b")])
            .unwrap_err();
        assert!(matches!(err, ConfigurateError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("app", "default/a", "1").unwrap();
        let opts = opts();
        let bridge = SecretBridge::new(&store, &opts);

        bridge.batch_delete(&["a", "never-stored"]).unwrap();
        bridge.batch_delete(&["a"]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn unavailable_store_surfaces_on_set() {
        let store = MemoryStore::unavailable();
        let opts = opts();
        let bridge = SecretBridge::new(&store, &opts);
        let entry = SecretPath::new("a", "a").to_entry("v".into());
        assert!(matches!(
            bridge.batch_set(&[entry]),
            Err(ConfigurateError::StoreUnavailable(_))
        ));
    }
}
