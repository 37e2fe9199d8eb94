//! Removable media (SD card) import and export.
//!
//! Bulk provisioning copies `keys.cfg` and `dl32.cfg` from the card into the
//! controller's data directory. Whatever file is about to be replaced is
//! first renamed with a timestamp suffix, on both import and export, so no
//! previous copy is ever lost.

use crate::config::ControllerConfig;
use crate::error::{StorageError, StorageResult};
use crate::files::{read_json, rotate_existing};
use crate::keystore::{KeyStore, validate_records};
use chrono::{DateTime, TimeZone};
use latchkey_core::constants::{CONFIG_FILE_NAME, KEYS_FILE_NAME};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Mount point of the removable medium, if the board has one.
#[derive(Debug, Clone, Default)]
pub struct AlternateMedia {
    root: Option<PathBuf>,
}

impl AlternateMedia {
    /// Media mounted at `root`.
    pub fn mounted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Board without a media slot.
    pub fn absent() -> Self {
        Self { root: None }
    }

    /// `true` if a medium is mounted and readable.
    pub fn is_present(&self) -> bool {
        self.root.as_deref().is_some_and(Path::is_dir)
    }

    /// Location of the key file on the medium.
    pub fn keys_path(&self) -> StorageResult<PathBuf> {
        Ok(self.root()?.join(KEYS_FILE_NAME))
    }

    /// Location of the configuration file on the medium.
    pub fn config_path(&self) -> StorageResult<PathBuf> {
        Ok(self.root()?.join(CONFIG_FILE_NAME))
    }

    /// Replace the key store with the medium's `keys.cfg`.
    ///
    /// The source is parsed before anything is touched; a missing or
    /// malformed source leaves the canonical store unchanged. Returns the
    /// number of keys now loaded.
    pub fn import_keys<Tz: TimeZone>(
        &self,
        store: &mut KeyStore,
        now: &DateTime<Tz>,
    ) -> StorageResult<usize>
    where
        Tz::Offset: fmt::Display,
    {
        let source = self.source(self.keys_path()?)?;
        let raw: BTreeMap<String, String> = read_json(&source)?;
        let keys = validate_records(raw);

        rotate_existing(store.path(), now)?;
        let count = store.replace(keys)?;

        info!(from = %source.display(), count, "keys imported from media");
        Ok(count)
    }

    /// Replace the configuration file at `destination` with the medium's
    /// `dl32.cfg`, returning the imported configuration.
    pub fn import_config<Tz: TimeZone>(
        &self,
        destination: &Path,
        now: &DateTime<Tz>,
    ) -> StorageResult<ControllerConfig>
    where
        Tz::Offset: fmt::Display,
    {
        let source = self.source(self.config_path()?)?;
        let config = ControllerConfig::load(&source)?;

        rotate_existing(destination, now)?;
        config.save(destination)?;

        info!(from = %source.display(), "configuration imported from media");
        Ok(config)
    }

    /// Copy the key store to the medium, returning the written path.
    pub fn export_keys<Tz: TimeZone>(
        &self,
        store: &KeyStore,
        now: &DateTime<Tz>,
    ) -> StorageResult<PathBuf>
    where
        Tz::Offset: fmt::Display,
    {
        let destination = self.keys_path()?;

        rotate_existing(&destination, now)?;
        store.write_to(&destination)?;

        info!(to = %destination.display(), count = store.len(), "keys exported to media");
        Ok(destination)
    }

    fn root(&self) -> StorageResult<&Path> {
        match self.root.as_deref() {
            Some(root) if root.is_dir() => Ok(root),
            _ => {
                warn!("no removable media present");
                Err(StorageError::MediaAbsent)
            }
        }
    }

    fn source(&self, path: PathBuf) -> StorageResult<PathBuf> {
        if path.is_file() {
            Ok(path)
        } else {
            warn!(path = %path.display(), "nothing to import");
            Err(StorageError::SourceMissing(path))
        }
    }
}
