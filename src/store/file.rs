//! Directory-backed store: one `<key>.json` file per key.

use crate::store::{validate_key, Store, StoreError};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use uuid::Uuid;

/// What a file looked like when this handle last touched it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

/// Store writing each key to its own JSON file inside `dir`.
///
/// Writes land in a hidden temp file unique to the write and are renamed into place,
/// so other processes reading the directory never observe a partially written value.
pub struct FileStore {
    dir: PathBuf,
    /// Last stamp observed per key; `None` records that the file was absent.
    seen: Mutex<HashMap<String, Option<Stamp>>>,
}

impl FileStore {
    /// Open (creating if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            dir,
            seen: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<String, Option<Stamp>>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stamp(path: &Path) -> Option<Stamp> {
        let meta = fs::metadata(path).ok()?;
        Some(Stamp {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }
}

impl Store for FileStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                self.seen().insert(key.to_string(), Self::stamp(&path));
                Ok(Some(contents))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.seen().insert(key.to_string(), None);
                Ok(None)
            }
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let tmp = self.dir.join(format!(".{key}.json.{}.tmp", Uuid::new_v4().simple()));
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&tmp, value).map_err(io_err)?;
        if let Err(source) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(source));
        }
        self.seen().insert(key.to_string(), Self::stamp(&path));
        Ok(())
    }

    fn poll_changes(&self) -> Vec<String> {
        let seen = self.seen();
        let mut changed: Vec<String> = seen
            .iter()
            .filter(|(key, last)| {
                let current = self
                    .path(key)
                    .ok()
                    .and_then(|path| Self::stamp(&path));
                current != **last
            })
            .map(|(key, _)| key.clone())
            .collect();
        changed.sort();
        changed
    }
}
