//! Filesystem access for configuration files.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::errors::{ConfigurateError, Result};

/// Write `bytes` to `path` atomically.
///
/// 1. Create missing parent directories.
/// 2. Write to a hidden temp file in the same directory and fsync it.
/// 3. Rename the temp file over `path`.
///
/// Readers never see a half-written file.  If the rename fails the temp
/// file is left in place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let tmp_path = temp_sibling(parent, path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        // Some platforms refuse to rename over an existing file.
        Err(e) if path.exists() => {
            warn!(path = %path.display(), "rename over existing file failed ({e}); retrying");
            fs::remove_file(path)?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// `.<name>.<nanos>-<random>.tmp` next to `path`.
fn temp_sibling(parent: &Path, path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let salt: u32 = rand::random();
    parent.join(format!(
        ".{}.{nanos}-{salt:08x}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Read the whole file.  A missing file is `NotFound`.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            ConfigurateError::NotFound(format!("config file {}", path.display()))
        }
        _ => ConfigurateError::Io(e),
    })
}

/// Remove the file.  Returns whether it existed.
pub fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
