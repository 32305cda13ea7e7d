//! Atomic file replacement and backups.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `contents` to `path` via a temp file in the same directory and an
/// atomic rename, so readers never observe a partial file.
///
/// Permissions are copied from `mode_from` when it exists, which keeps
/// private files such as `~/.ssh/config` private.
pub fn write_atomic(path: &Path, contents: &str, mode_from: Option<&Path>) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    if let Some(source) = mode_from {
        if let Ok(meta) = fs::metadata(source) {
            fs::set_permissions(tmp.path(), meta.permissions())?;
        }
    }

    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Copy `path` to `<path>.bak.<timestamp>` and return the backup path.
///
/// A numeric suffix is appended if a backup with the same timestamp already
/// exists.
pub fn backup(path: &Path) -> io::Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    let mut target = suffixed(path, &format!(".bak.{}", stamp));
    let mut n = 1;
    while target.exists() {
        target = suffixed(path, &format!(".bak.{}.{}", stamp, n));
        n += 1;
    }

    fs::copy(path, &target)?;
    debug!(from = %path.display(), to = %target.display(), "created backup");
    Ok(target)
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
