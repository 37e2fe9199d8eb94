//! JSON file helpers shared by the key store, config and media modules.

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, TimeZone};
use latchkey_core::constants::BACKUP_SUFFIX_FORMAT;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::json(path, e))
}

/// Serialize `value` to `path`, replacing the file atomically.
///
/// The data is written to a sibling temporary file first and renamed over
/// the destination, so a crash never leaves a truncated store behind.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let json = serde_json::to_vec_pretty(value).map_err(|e| StorageError::json(path, e))?;

    let tmp = temp_path(path);
    fs::write(&tmp, &json).map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StorageError::io(path, e)
    })?;

    debug!(path = %path.display(), bytes = json.len(), "wrote JSON file");
    Ok(())
}

/// Rename an existing `path` out of the way before it is overwritten.
///
/// The backup is named `<stem>_<YYYYMMDD_HHMMSS>.<ext>` next to the original;
/// if that name is taken a `_N` counter is appended. Returns the backup path,
/// or `None` if there was nothing to rename.
pub fn rotate_existing<Tz: TimeZone>(path: &Path, now: &DateTime<Tz>) -> StorageResult<Option<PathBuf>>
where
    Tz::Offset: fmt::Display,
{
    if !path.exists() {
        return Ok(None);
    }

    let stamp = now.format(BACKUP_SUFFIX_FORMAT).to_string();
    let mut backup = backup_path(path, &stamp, 0);
    let mut attempt = 0;
    while backup.exists() {
        attempt += 1;
        backup = backup_path(path, &stamp, attempt);
    }

    fs::rename(path, &backup).map_err(|e| StorageError::io(path, e))?;
    info!(from = %path.display(), to = %backup.display(), "kept previous file as backup");
    Ok(Some(backup))
}

fn backup_path(path: &Path, stamp: &str, attempt: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{stem}_{stamp}");
    if attempt > 0 {
        name.push_str(&format!("_{attempt}"));
    }
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
