//! Persisted allow-list of credentials.
//!
//! The store is a flat JSON object mapping credential id to label:
//!
//! ```json
//! { "12345": "Alice", "4242": "20240229_235901" }
//! ```
//!
//! Every mutation rewrites the whole file before returning. If the write
//! fails the in-memory map is rolled back, so memory and disk never disagree
//! about who is authorized.

use crate::error::{StorageError, StorageResult};
use crate::files::{read_json, write_json_atomic};
use latchkey_core::{CredentialId, Label};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Credential id to label mapping backed by a JSON file.
#[derive(Debug)]
pub struct KeyStore {
    path: PathBuf,
    keys: BTreeMap<CredentialId, Label>,
}

impl KeyStore {
    /// Create an empty store persisted at `path`. Nothing is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Create a store and load it from `path`, falling back to empty.
    ///
    /// Returns the load error alongside the (empty) store so the caller can
    /// report it.
    pub fn open(path: impl Into<PathBuf>) -> (Self, Option<StorageError>) {
        let mut store = Self::new(path);
        let err = store.load().err();
        (store, err)
    }

    /// Replace the in-memory contents with the persisted file.
    ///
    /// A missing file is an empty store. On any read or parse error the
    /// store is left empty and the error returned. Records whose id or label
    /// fail validation are skipped with a warning.
    ///
    /// Returns the number of keys loaded.
    pub fn load(&mut self) -> StorageResult<usize> {
        self.keys.clear();

        if !self.path.exists() {
            info!(path = %self.path.display(), "no key store yet, starting empty");
            return Ok(0);
        }

        let raw: BTreeMap<String, String> = read_json(&self.path).inspect_err(|e| {
            error!(error = %e, "failed to load key store, continuing with no keys");
        })?;
        self.keys = validate_records(raw);

        info!(path = %self.path.display(), count = self.keys.len(), "key store loaded");
        Ok(self.keys.len())
    }

    /// Authorize `id` under `label`, replacing any existing label.
    ///
    /// # Errors
    /// - `StorageError::Validation` if the id is not 2-6 digits or the label
    ///   is not 1-15 characters
    /// - `StorageError::Io` if the store could not be written
    pub fn add(&mut self, id: &str, label: &str) -> StorageResult<()> {
        let id = CredentialId::new(id)?;
        let label = Label::new(label)?;

        let previous = self.keys.insert(id.clone(), label);
        if let Err(e) = self.persist() {
            match previous {
                Some(previous) => self.keys.insert(id, previous),
                None => self.keys.remove(&id),
            };
            return Err(e);
        }

        info!(id = %id, "key added");
        Ok(())
    }

    /// Revoke `id`.
    ///
    /// # Errors
    /// - `StorageError::KeyNotFound` if `id` is not in the store
    /// - `StorageError::Io` if the store could not be written
    pub fn remove(&mut self, id: &str) -> StorageResult<()> {
        let (id, label) = self
            .lookup(id)
            .and_then(|id| self.keys.remove_entry(&id))
            .ok_or_else(|| StorageError::KeyNotFound(id.trim().to_string()))?;

        if let Err(e) = self.persist() {
            self.keys.insert(id, label);
            return Err(e);
        }

        info!(id = %id, "key removed");
        Ok(())
    }

    /// Change the label of an existing key.
    ///
    /// Renaming to the current label changes nothing and writes nothing.
    ///
    /// # Errors
    /// - `StorageError::KeyNotFound` if `id` is not in the store
    /// - `StorageError::Validation` if the label is not 1-15 characters
    /// - `StorageError::Io` if the store could not be written
    pub fn rename(&mut self, id: &str, label: &str) -> StorageResult<()> {
        let id = self
            .lookup(id)
            .ok_or_else(|| StorageError::KeyNotFound(id.trim().to_string()))?;
        let label = Label::new(label)?;

        let Some(current) = self.keys.get_mut(&id) else {
            return Err(StorageError::KeyNotFound(id.to_string()));
        };
        if *current == label {
            debug!(id = %id, "rename to identical label");
            return Ok(());
        }

        let previous = std::mem::replace(current, label);
        if let Err(e) = self.persist() {
            self.keys.insert(id, previous);
            return Err(e);
        }

        info!(id = %id, "key renamed");
        Ok(())
    }

    /// Revoke every key and persist the empty store.
    pub fn purge(&mut self) -> StorageResult<()> {
        let previous = std::mem::take(&mut self.keys);
        if let Err(e) = self.persist() {
            self.keys = previous;
            return Err(e);
        }

        info!(count = previous.len(), "key store purged");
        Ok(())
    }

    /// `true` iff `id` is in the store. Malformed ids are never authorized.
    pub fn is_authorized(&self, id: &str) -> bool {
        self.label(id).is_some()
    }

    /// Label of `id`, if present.
    pub fn label(&self, id: &str) -> Option<&Label> {
        self.lookup(id).and_then(|id| self.keys.get(&id))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&CredentialId, &Label)> {
        self.keys.iter()
    }

    /// Canonical file backing the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to another file (used for export).
    pub fn write_to(&self, path: &Path) -> StorageResult<()> {
        write_json_atomic(path, &self.keys)
    }

    /// Persist `keys` as the whole store, then adopt them in memory.
    pub(crate) fn replace(&mut self, keys: BTreeMap<CredentialId, Label>) -> StorageResult<usize> {
        write_json_atomic(&self.path, &keys)?;
        self.keys = keys;
        Ok(self.keys.len())
    }

    fn lookup(&self, id: &str) -> Option<CredentialId> {
        CredentialId::new(id).ok()
    }

    fn persist(&self) -> StorageResult<()> {
        write_json_atomic(&self.path, &self.keys).inspect_err(|e| {
            error!(error = %e, "failed to persist key store");
        })
    }
}

/// Keep the records whose id and label are both valid.
pub(crate) fn validate_records(raw: BTreeMap<String, String>) -> BTreeMap<CredentialId, Label> {
    let mut keys = BTreeMap::new();
    for (id, label) in raw {
        match (CredentialId::new(&id), Label::new(&label)) {
            (Ok(id), Ok(label)) => {
                keys.insert(id, label);
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(id = %id, error = %e, "skipping invalid key record");
            }
        }
    }
    keys
}
