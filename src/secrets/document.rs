//! Locked and unlocked document handles.
//!
//! A `LockedDocument` has every secret leaf set to `null`; it is safe to
//! log, clone, and write to disk.  An `UnlockedDocument` holds plaintext
//! secrets.  It cannot be serialized, its `Debug` output hides the data,
//! and its secret leaves are zeroed when it is locked or dropped.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::entry::SecretPath;
use super::separator::scrub;

/// A document whose secret leaves are `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LockedDocument {
    data: Value,
}

impl LockedDocument {
    pub(crate) fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_value(self) -> Value {
        self.data
    }
}

/// A document with its secrets inlined.
///
/// Call `lock` (or drop it) as soon as the secrets are no longer needed.
/// Zeroing covers the secret leaves themselves; copies the caller made
/// through `data()` are the caller's responsibility.
pub struct UnlockedDocument {
    data: Value,
    secret_paths: Vec<SecretPath>,
}

impl UnlockedDocument {
    pub(crate) fn new(data: Value, secret_paths: Vec<SecretPath>) -> Self {
        Self { data, secret_paths }
    }

    /// Borrow the unlocked data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Look up a leaf by dotpath (e.g. `"database.password"`).
    pub fn get(&self, dotpath: &str) -> Option<&Value> {
        dotpath
            .split('.')
            .try_fold(&self.data, |current, seg| current.as_object()?.get(seg))
    }

    /// Secret dotpaths this document carries.
    pub fn secret_paths(&self) -> &[SecretPath] {
        &self.secret_paths
    }

    /// Give up the handle and return the plaintext tree.
    ///
    /// Used where the data has to cross a boundary as a plain value; the
    /// returned tree is no longer zeroed on drop.
    pub fn into_plaintext(mut self) -> Value {
        std::mem::take(&mut self.data)
    }

    /// Zero the secrets and hand back the locked document.
    pub fn lock(mut self) -> LockedDocument {
        scrub(&mut self.data, &self.secret_paths);
        LockedDocument::new(std::mem::take(&mut self.data))
    }
}

impl Drop for UnlockedDocument {
    fn drop(&mut self) {
        scrub(&mut self.data, &self.secret_paths);
    }
}

impl fmt::Debug for UnlockedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedDocument")
            .field("secrets", &self.secret_paths.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unlocked() -> UnlockedDocument {
        UnlockedDocument::new(
            json!({"host": "h", "db": {"password": "s3cr3t"}}),
            vec![SecretPath::new("db-password", "db.password")],
        )
    }

    #[test]
    fn lock_nulls_secrets() {
        let locked = unlocked().lock();
        assert_eq!(
            locked.data(),
            &json!({"host": "h", "db": {"password": null}})
        );
    }

    #[test]
    fn get_follows_dotpaths() {
        let doc = unlocked();
        assert_eq!(doc.get("db.password"), Some(&json!("s3cr3t")));
        assert_eq!(doc.get("db.missing"), None);
        assert_eq!(doc.get("host.deeper"), None);
    }

    #[test]
    fn debug_does_not_show_secrets() {
        let shown = format!("{:?}", unlocked());
        assert!(!shown.contains("s3cr3t"));
    }

    #[test]
    fn locked_serializes_as_plain_data() {
        let locked = LockedDocument::new(json!({"a": null}));
        assert_eq!(serde_json::to_string(&locked).unwrap(), r#"{"a":null}"#);
    }
}
