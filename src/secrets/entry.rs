//! Secret locations and extracted secret values.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::schema::Kind;

/// Where a secret lives: its keyring id and its dotpath in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretPath {
    /// Unique id declared in the schema; part of the keyring account key.
    pub id: String,

    /// Dot-separated location inside the document (e.g. `"database.password"`).
    pub dotpath: String,

    /// Declared leaf kind, when known.  Lets `merge` tell the string
    /// `"42"` apart from the number `42`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
}

impl SecretPath {
    pub fn new(id: &str, dotpath: &str) -> Self {
        Self {
            id: id.to_string(),
            dotpath: dotpath.to_string(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Attach a value, producing an entry.
    pub fn to_entry(&self, value: String) -> SecretEntry {
        SecretEntry {
            id: self.id.clone(),
            dotpath: self.dotpath.clone(),
            value,
            kind: self.kind,
        }
    }
}

/// One secret extracted from (or destined for) a document.
///
/// The value is zeroed when the entry is dropped, and never shown by `Debug`.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SecretEntry {
    pub id: String,
    pub dotpath: String,

    /// Textual secret value.  Empty when the entry only names a location
    /// (e.g. in an unlock request).
    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub kind: Option<Kind>,
}

impl SecretEntry {
    /// The location part of this entry.
    pub fn path(&self) -> SecretPath {
        SecretPath {
            id: self.id.clone(),
            dotpath: self.dotpath.clone(),
            kind: self.kind,
        }
    }
}

impl fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEntry")
            .field("id", &self.id)
            .field("dotpath", &self.dotpath)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
