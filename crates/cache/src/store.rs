//! Text key/value substrate
//!
//! Services never touch the filesystem directly; they get a
//! `KeyValueStore` at construction. `MemoryStore` backs tests,
//! `FileStore` backs the real app.

use crate::error::{CacheError, CacheResult};
use crate::keys;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Durable string storage keyed by logical cache keys
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written or was deleted
    fn read(&self, key: &str) -> CacheResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Deleting a missing key is not an error
    fn delete(&self, key: &str) -> CacheResult<()>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Unavailable("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// One file per key under a directory
///
/// Writes go through a temp file in the same directory followed by a
/// rename, so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        ensure_directory_exists(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", keys::escape(key)))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Read { path, source: e }),
        }
    }

    fn write(&self, key: &str, value: &str) -> CacheResult<()> {
        write_atomic(&self.root, &self.path_for(key), value.as_bytes())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        remove_if_exists(&self.path_for(key))
    }
}

pub(crate) fn ensure_directory_exists(path: &Path) -> CacheResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| CacheError::DirectoryCreation {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Created cache directory: {}", path.display());
    }
    Ok(())
}

/// Writes `bytes` to a temp file in `dir` and renames it over `target`
pub(crate) fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> CacheResult<()> {
    let write_err = |source| CacheError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(bytes).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file
        .persist(target)
        .map_err(|e| write_err(e.error))?;
    Ok(())
}

pub(crate) fn remove_if_exists(path: &Path) -> CacheResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::Write {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
