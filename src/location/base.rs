//! Base directories and how they map onto the filesystem.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurateError, Result};

/// The well-known directory a configuration file lives under.
///
/// `App*` variants are scoped to the application: their path carries
/// the application identifier as a directory component, which
/// `dirName` replaces.  All other variants are shared locations where
/// `dirName` is appended as an extra directory instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseDirectory {
    AppConfig,
    AppData,
    AppLocalData,
    AppCache,
    AppLog,
    Config,
    Data,
    LocalData,
    Cache,
    Home,
    Document,
    Desktop,
    Download,
    Temp,
}

impl BaseDirectory {
    /// Short kebab-case name, used as the directory name under a fixed root.
    pub fn slug(self) -> &'static str {
        match self {
            Self::AppConfig => "app-config",
            Self::AppData => "app-data",
            Self::AppLocalData => "app-local-data",
            Self::AppCache => "app-cache",
            Self::AppLog => "app-log",
            Self::Config => "config",
            Self::Data => "data",
            Self::LocalData => "local-data",
            Self::Cache => "cache",
            Self::Home => "home",
            Self::Document => "document",
            Self::Desktop => "desktop",
            Self::Download => "download",
            Self::Temp => "temp",
        }
    }

    /// Whether this directory carries the application identifier.
    pub fn is_app_scoped(self) -> bool {
        matches!(
            self,
            Self::AppConfig | Self::AppData | Self::AppLocalData | Self::AppCache | Self::AppLog
        )
    }

    /// Fixed segments that follow the identifier component.
    pub(crate) fn trailing_segments(self) -> &'static [&'static str] {
        match self {
            Self::AppLog => &["logs"],
            _ => &[],
        }
    }

    /// OS location of the directory, before any identifier is applied.
    fn system_root(self) -> Option<PathBuf> {
        match self {
            Self::AppConfig | Self::Config => dirs::config_dir(),
            Self::AppData | Self::Data => dirs::data_dir(),
            Self::AppLocalData | Self::AppLog | Self::LocalData => dirs::data_local_dir(),
            Self::AppCache | Self::Cache => dirs::cache_dir(),
            Self::Home => dirs::home_dir(),
            Self::Document => dirs::document_dir(),
            Self::Desktop => dirs::desktop_dir(),
            Self::Download => dirs::download_dir(),
            Self::Temp => Some(std::env::temp_dir()),
        }
    }
}

impl fmt::Display for BaseDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Where base directories are rooted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryRoots {
    /// Ask the operating system (via `dirs`).
    System,
    /// Every base directory is `<root>/<slug>`.
    Fixed(PathBuf),
}

impl DirectoryRoots {
    /// Absolute root for `dir`, without identifier or trailing segments.
    pub(crate) fn root_of(&self, dir: BaseDirectory) -> Result<PathBuf> {
        let root = match self {
            Self::System => dir.system_root().ok_or_else(|| {
                ConfigurateError::NotFound(format!(
                    "the '{dir}' directory is not available on this platform"
                ))
            })?,
            Self::Fixed(root) => root.join(dir.slug()),
        };

        if root.is_absolute() {
            Ok(root)
        } else {
            Ok(std::env::current_dir()?.join(root))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_app_directories_are_scoped() {
        assert!(BaseDirectory::AppConfig.is_app_scoped());
        assert!(BaseDirectory::AppLog.is_app_scoped());
        assert!(!BaseDirectory::Config.is_app_scoped());
        assert!(!BaseDirectory::Temp.is_app_scoped());
    }

    #[test]
    fn deserializes_from_camel_case() {
        let dir: BaseDirectory = serde_json::from_str("\"appLocalData\"").unwrap();
        assert_eq!(dir, BaseDirectory::AppLocalData);
    }

    #[test]
    fn fixed_root_uses_slug() {
        let roots = DirectoryRoots::Fixed(PathBuf::from("/opt/cfg"));
        assert_eq!(
            roots.root_of(BaseDirectory::AppCache).unwrap(),
            PathBuf::from("/opt/cfg/app-cache")
        );
    }

    #[test]
    fn relative_fixed_root_is_made_absolute() {
        let roots = DirectoryRoots::Fixed(PathBuf::from("relative"));
        assert!(roots.root_of(BaseDirectory::Data).unwrap().is_absolute());
    }

    #[test]
    fn temp_is_always_available() {
        assert!(DirectoryRoots::System.root_of(BaseDirectory::Temp).is_ok());
    }
}
