//! JSON file credential store.
//!
//! The whole key-value map lives in one small JSON object. Every write
//! rewrites the file atomically, so a crash leaves either the old or the
//! new map on disk.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_write::write_atomic;
use crate::domain::ports::{CredentialStore, CredentialStoreError};

/// Credential store persisted as a JSON object in one file.
#[derive(Debug)]
pub struct FileCredentialStore {
    dir: Dir,
    file_name: String,
    guard: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating its directory when missing. The
    /// file itself is created on first write.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Unavailable`] when the path has no
    /// file name or its directory cannot be created or opened.
    pub fn open(path: &Path) -> Result<Self, CredentialStoreError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CredentialStoreError::unavailable(format!(
                    "`{}` does not name a file",
                    path.display()
                ))
            })?
            .to_owned();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Dir::create_ambient_dir_all(parent, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(parent, ambient_authority()))
            .map(|dir| Self {
                dir,
                file_name,
                guard: Mutex::new(()),
            })
            .map_err(|err| {
                CredentialStoreError::unavailable(format!("{}: {err}", parent.display()))
            })
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialStoreError> {
        let raw = match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(CredentialStoreError::unavailable(err.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|err| CredentialStoreError::corrupt(format!("{}: {err}", self.file_name)))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialStoreError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, &contents)
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))
    }

    fn modify(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), CredentialStoreError> {
        let _held = self
            .guard
            .lock()
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))?;
        let mut entries = self.read_entries()?;
        if apply(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        let _held = self
            .guard
            .lock()
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))?;
        Ok(self.read_entries()?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        debug!(key, "storing credential");
        self.modify(|entries| {
            entries.insert(key.to_owned(), value.to_owned()).as_deref() != Some(value)
        })
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}
