use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurateError, Result};
use crate::location::resolver::validate_component;
use crate::location::{DirectoryRoots, PathResolver};

/// Runtime settings, loaded from a `configurate.toml` file.
///
/// Every field has a sensible default so Configurate works out-of-the-box
/// without any settings file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application identifier used as the directory component of
    /// app-scoped base directories (e.g. `~/.config/<identifier>`).
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// When set, every base directory resolves beneath this root
    /// instead of the OS-provided location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,

    /// Pretty-print JSON documents (default: true).
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_identifier() -> String {
    "configurate".to_string()
}

fn default_pretty_json() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            root_dir: None,
            pretty_json: default_pretty_json(),
        }
    }
}

impl Settings {
    /// Conventional name of the settings file.
    pub const FILE_NAME: &'static str = "configurate.toml";

    /// Load settings from the TOML file at `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ConfigurateError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        validate_component(&settings.identifier, "identifier").map_err(|e| {
            ConfigurateError::ConfigError(format!("{}: {e}", path.display()))
        })?;

        Ok(settings)
    }

    /// Build the path resolver these settings describe.
    pub fn path_resolver(&self) -> PathResolver {
        let roots = match &self.root_dir {
            Some(root) => DirectoryRoots::Fixed(root.clone()),
            None => DirectoryRoots::System,
        };
        PathResolver::new(&self.identifier, roots)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
