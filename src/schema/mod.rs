//! Configuration schemas.
//!
//! A `Schema` is an immutable tree describing the shape of a document:
//! typed primitive leaves, secret leaves (kept in the OS keyring, never on
//! disk) and nested objects.  Secret ids must be unique across the whole
//! tree; `SchemaBuilder::build` rejects duplicates.
//!
//! ```
//! use configurate::schema::{Kind, Schema};
//!
//! let schema = Schema::builder()
//!     .field("host", Kind::String)
//!     .secret("password", Kind::String, "db-password")
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.secret_paths()[0].dotpath, "password");
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ConfigurateError, Result};
use crate::secrets::SecretPath;

/// Primitive kinds a leaf may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Number,
    Boolean,
}

impl Kind {
    pub(crate) fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::String, Value::String(_))
                | (Kind::Number, Value::Number(_))
                | (Kind::Boolean, Value::Bool(_))
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
        })
    }
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive(Kind),
    Secret { kind: Kind, id: String },
    Object(Vec<(String, SchemaNode)>),
}

/// An immutable, validated schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<(String, SchemaNode)>,
    secret_paths: Vec<SecretPath>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Top-level fields in declaration order.
    pub fn fields(&self) -> &[(String, SchemaNode)] {
        &self.fields
    }

    /// Every secret leaf as `(id, dotpath)`, in declaration order.
    pub fn secret_paths(&self) -> &[SecretPath] {
        &self.secret_paths
    }

    pub fn has_secrets(&self) -> bool {
        !self.secret_paths.is_empty()
    }

    /// Check a document against this schema's shape.
    ///
    /// Fields that are present must have the declared kind; secret
    /// leaves may also be `null` (locked).  Absent fields and fields the
    /// schema does not declare are accepted.
    pub fn check(&self, document: &Value) -> Result<()> {
        let map = document.as_object().ok_or_else(|| {
            ConfigurateError::ConfigError("document must be an object".into())
        })?;
        check_fields(&self.fields, map, "")
    }
}

fn check_fields(
    fields: &[(String, SchemaNode)],
    map: &serde_json::Map<String, Value>,
    prefix: &str,
) -> Result<()> {
    for (name, node) in fields {
        let Some(value) = map.get(name) else {
            continue;
        };
        let path = join(prefix, name);
        match node {
            SchemaNode::Primitive(kind) if !kind.matches(value) => {
                return Err(mismatch(&path, &kind.to_string(), value));
            }
            SchemaNode::Secret { kind, .. } if !value.is_null() && !kind.matches(value) => {
                return Err(mismatch(&path, &kind.to_string(), value));
            }
            SchemaNode::Object(children) => match value {
                Value::Object(inner) => check_fields(children, inner, &path)?,
                other => return Err(mismatch(&path, "object", other)),
            },
            _ => {}
        }
    }
    Ok(())
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ConfigurateError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ConfigurateError::ConfigError(format!(
        "field '{path}' should be a {expected}, found {found}"
    ))
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Builder for `Schema`.  Fields keep their declaration order.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, SchemaNode)>,
}

impl SchemaBuilder {
    /// Declare a plain primitive field.
    pub fn field(mut self, name: &str, kind: Kind) -> Self {
        self.fields
            .push((name.to_string(), SchemaNode::Primitive(kind)));
        self
    }

    /// Declare a secret field stored in the keyring under `id`.
    pub fn secret(mut self, name: &str, kind: Kind, id: &str) -> Self {
        self.fields.push((
            name.to_string(),
            SchemaNode::Secret {
                kind,
                id: id.to_string(),
            },
        ));
        self
    }

    /// Declare a nested object built by `f`.
    pub fn object(mut self, name: &str, f: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        let inner = f(SchemaBuilder::default());
        self.fields
            .push((name.to_string(), SchemaNode::Object(inner.fields)));
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Rejects empty field names, names containing `.` (the dotpath
    /// separator), repeated names within one object, empty secret ids and
    /// secret ids used more than once anywhere in the tree.
    pub fn build(self) -> Result<Schema> {
        let mut secret_paths = Vec::new();
        let mut seen_ids = HashSet::new();
        collect(&self.fields, "", &mut secret_paths, &mut seen_ids)?;
        Ok(Schema {
            fields: self.fields,
            secret_paths,
        })
    }
}

fn collect(
    fields: &[(String, SchemaNode)],
    prefix: &str,
    out: &mut Vec<SecretPath>,
    seen_ids: &mut HashSet<String>,
) -> Result<()> {
    let mut names = HashSet::new();
    for (name, node) in fields {
        if name.is_empty() || name.contains('.') {
            return Err(ConfigurateError::ConfigError(format!(
                "invalid field name '{name}' under '{prefix}': must be non-empty and contain no '.'"
            )));
        }
        if !names.insert(name.as_str()) {
            return Err(ConfigurateError::ConfigError(format!(
                "field '{}' is declared twice",
                join(prefix, name)
            )));
        }

        let path = join(prefix, name);
        match node {
            SchemaNode::Primitive(_) => {}
            SchemaNode::Secret { kind, id } => {
                if id.is_empty() {
                    return Err(ConfigurateError::ConfigError(format!(
                        "secret field '{path}' has an empty id"
                    )));
                }
                if !seen_ids.insert(id.clone()) {
                    return Err(ConfigurateError::ConfigError(format!(
                        "duplicate secret id '{id}' (at '{path}')"
                    )));
                }
                out.push(SecretPath::new(id, &path).with_kind(*kind));
            }
            SchemaNode::Object(children) => collect(children, &path, out, seen_ids)?,
        }
    }
    Ok(())
}
