//! Process-local credential store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use zeroize::Zeroizing;

use super::CredentialStore;
use crate::errors::{ConfigurateError, Result};

/// Number of calls a `MemoryStore` has served, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub get: usize,
    pub set: usize,
    pub delete: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.get + self.set + self.delete
    }
}

/// In-memory `CredentialStore`.  Values are zeroed when replaced or removed.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), Zeroizing<String>>>,
    unavailable: bool,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every call with `StoreUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Calls served so far.
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            get: self.gets.load(Ordering::SeqCst),
            set: self.sets.load(Ordering::SeqCst),
            delete: self.deletes.load(Ordering::SeqCst),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, String), Zeroizing<String>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(ConfigurateError::StoreUnavailable(
                "in-memory store is marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

fn key(service: &str, account: &str) -> (String, String) {
    (service.to_string(), account.to_string())
}

impl CredentialStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> Result<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.lock()
            .get(&key(service, account))
            .map(|v| v.to_string())
            .ok_or_else(|| ConfigurateError::NotFound(format!("keyring entry {service}/{account}")))
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.lock()
            .insert(key(service, account), Zeroizing::new(value.to_string()));
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        match self.lock().remove(&key(service, account)) {
            Some(_) => Ok(()),
            None => Err(ConfigurateError::NotFound(format!(
                "keyring entry {service}/{account}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        store.set("svc", "acc/a", "v1").unwrap();
        store.set("svc", "acc/a", "v2").unwrap();
        assert_eq!(store.get("svc", "acc/a").unwrap(), "v2");
        assert_eq!(store.len(), 1);

        store.delete("svc", "acc/a").unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.get("svc", "acc/a"),
            Err(ConfigurateError::NotFound(_))
        ));
    }

    #[test]
    fn counts_calls() {
        let store = MemoryStore::new();
        store.set("s", "a", "v").unwrap();
        let _ = store.get("s", "a");
        let _ = store.get("s", "missing");
        let _ = store.delete("s", "missing");
        assert_eq!(
            store.calls(),
            StoreCalls {
                get: 2,
                set: 1,
                delete: 1
            }
        );
    }

    #[test]
    fn unavailable_store_refuses_everything() {
        let store = MemoryStore::unavailable();
        assert!(matches!(
            store.set("s", "a", "v"),
            Err(ConfigurateError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.get("s", "a"),
            Err(ConfigurateError::StoreUnavailable(_))
        ));
    }
}
