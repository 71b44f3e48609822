//! The call boundary.
//!
//! A host (an IPC bridge, a plugin runtime) hands over a command name and
//! a JSON payload and gets back a JSON result or a structured error:
//!
//! ```text
//! invoke(app, "load", {"name": "app.json", "dir": "appConfig", "format": "json"})
//!   -> Ok({"host": "localhost", "password": null})
//!   |  Err({"kind": "not_found", "message": "..."})   (via `Serialize`)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::{ConfigurateError, Result};
use crate::store::{ConfigRequest, Configurate, UnlockRequest};

/// Operations exposed across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Load,
    Save,
    Delete,
    Unlock,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Load => "load",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Unlock => "unlock",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = ConfigurateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "load" => Ok(Self::Load),
            "save" => Ok(Self::Save),
            "delete" => Ok(Self::Delete),
            "unlock" => Ok(Self::Unlock),
            other => Err(ConfigurateError::ConfigError(format!(
                "unknown command '{other}'"
            ))),
        }
    }
}

/// Run `command` with a JSON `payload`.
///
/// Returns the resulting document (secrets included when the request
/// asked for an unlocked one), or `null` for delete.
pub fn invoke(app: &Configurate, command: &str, payload: Value) -> Result<Value> {
    let command: Command = command.parse()?;
    debug!(%command, "invoke");

    match command {
        Command::Create => Ok(app.create(&parse::<ConfigRequest>(command, payload)?)?.into_value()),
        Command::Save => Ok(app.save(&parse::<ConfigRequest>(command, payload)?)?.into_value()),
        Command::Load => Ok(app.load(&parse::<ConfigRequest>(command, payload)?)?.into_value()),
        Command::Delete => {
            app.delete(&parse::<ConfigRequest>(command, payload)?)?;
            Ok(Value::Null)
        }
        Command::Unlock => Ok(app
            .unlock(&parse::<UnlockRequest>(command, payload)?)?
            .into_plaintext()),
    }
}

/// `invoke`, with the error folded into the JSON result as
/// `{"error": {"kind": ..., "message": ...}}`.
pub fn invoke_json(app: &Configurate, command: &str, payload: Value) -> Value {
    match invoke(app, command, payload) {
        Ok(value) => serde_json::json!({ "ok": value }),
        Err(e) => serde_json::json!({ "error": e }),
    }
}

fn parse<T: DeserializeOwned>(command: Command, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| ConfigurateError::ConfigError(format!("invalid {command} payload: {e}")))
}
