//! Turns a base directory plus caller-supplied names into one validated path.
//!
//! ```text
//! <base root> / <dirName | identifier> / <trailing> / <path segments…> / <filename>
//! ```
//!
//! Every caller-supplied component is validated before anything touches
//! the filesystem.  All rejections are `InvalidPath`.

use std::path::PathBuf;

use tracing::trace;

use super::base::{BaseDirectory, DirectoryRoots};
use crate::errors::{ConfigurateError, Result};

/// Characters rejected in every component, on every platform.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Resolves configuration file locations.
#[derive(Debug, Clone)]
pub struct PathResolver {
    identifier: String,
    roots: DirectoryRoots,
}

impl PathResolver {
    pub fn new(identifier: &str, roots: DirectoryRoots) -> Self {
        Self {
            identifier: identifier.to_string(),
            roots,
        }
    }

    /// The application identifier applied to app-scoped directories.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Resolve the absolute path of a configuration file.
    ///
    /// - `dir_name` replaces the identifier of app-scoped directories and
    ///   is appended to shared ones.  Split on both `/` and `\`.
    /// - `sub_path` is split on `/` only and appended after that.
    /// - `filename` is used verbatim; no extension is added.
    pub fn resolve(
        &self,
        dir: BaseDirectory,
        dir_name: Option<&str>,
        sub_path: Option<&str>,
        filename: &str,
    ) -> Result<PathBuf> {
        validate_component(filename, "filename")?;
        let dir_segments = match dir_name {
            Some(name) => split_validated(name, &['/', '\\'], "dirName")?,
            None => Vec::new(),
        };
        let sub_segments = match sub_path {
            Some(sub) => split_validated(sub, &['/'], "path")?,
            None => Vec::new(),
        };

        if dir.is_app_scoped() && dir_segments.is_empty() {
            validate_component(&self.identifier, "identifier")?;
        }

        let mut path = self.roots.root_of(dir)?;
        if dir.is_app_scoped() {
            if dir_segments.is_empty() {
                path.push(&self.identifier);
            }
            path.extend(&dir_segments);
            path.extend(dir.trailing_segments());
        } else {
            path.extend(&dir_segments);
        }
        path.extend(&sub_segments);
        path.push(filename);

        trace!(%dir, path = %path.display(), "resolved configuration path");
        Ok(path)
    }
}

/// Split `raw` on `separators` and validate each segment.
fn split_validated<'a>(raw: &'a str, separators: &[char], what: &str) -> Result<Vec<&'a str>> {
    raw.split(|c| separators.contains(&c))
        .map(|segment| validate_component(segment, what).map(|()| segment))
        .collect()
}

/// Validate a single path component.
///
/// Leading dots are fine (`.env`), but the component must not be empty,
/// `.` or `..`, and must not contain any reserved character.
pub(crate) fn validate_component(component: &str, what: &str) -> Result<()> {
    if component.is_empty() {
        return Err(ConfigurateError::InvalidPath(format!(
            "{what} contains an empty component"
        )));
    }
    if component == "." || component == ".." {
        return Err(ConfigurateError::InvalidPath(format!(
            "{what} component '{component}' is not allowed"
        )));
    }
    if let Some(bad) = component.chars().find(|c| RESERVED.contains(c)) {
        return Err(ConfigurateError::InvalidPath(format!(
            "{what} component {component:?} contains reserved character {bad:?}"
        )));
    }
    Ok(())
}
