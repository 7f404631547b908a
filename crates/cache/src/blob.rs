//! Audio payload storage
//!
//! Blobs live in their own namespace next to the key/value cache. A stored
//! blob is addressed by a [`BlobRef`] URL that the playback controller can
//! load like any other audio reference.

use crate::error::{CacheError, CacheResult};
use crate::keys;
use crate::store::{ensure_directory_exists, remove_if_exists, write_atomic};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storyspark_core::{BlobRef, StoryId};
use url::Url;

/// Binary storage keyed by story id
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` for `id`, replacing any previous payload atomically
    fn put(&self, id: &StoryId, bytes: &[u8]) -> CacheResult<BlobRef>;

    /// Returns a locally resolvable reference if a payload is stored
    fn locate(&self, id: &StoryId) -> CacheResult<Option<BlobRef>>;

    fn read(&self, id: &StoryId) -> CacheResult<Option<Vec<u8>>>;

    /// Deleting a missing blob is not an error
    fn delete(&self, id: &StoryId) -> CacheResult<()>;
}

/// In-process blob store; references use the `memory://blob/` scheme
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<StoryId, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn reference(id: &StoryId) -> BlobRef {
        BlobRef::new(format!("memory://blob/{}", keys::escape(id.as_str())))
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Unavailable("blob store lock poisoned".to_string())
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, id: &StoryId, bytes: &[u8]) -> CacheResult<BlobRef> {
        self.blobs
            .lock()
            .map_err(poisoned)?
            .insert(id.clone(), bytes.to_vec());
        Ok(Self::reference(id))
    }

    fn locate(&self, id: &StoryId) -> CacheResult<Option<BlobRef>> {
        let blobs = self.blobs.lock().map_err(poisoned)?;
        Ok(blobs.contains_key(id).then(|| Self::reference(id)))
    }

    fn read(&self, id: &StoryId) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.blobs.lock().map_err(poisoned)?.get(id).cloned())
    }

    fn delete(&self, id: &StoryId) -> CacheResult<()> {
        self.blobs.lock().map_err(poisoned)?.remove(id);
        Ok(())
    }
}

/// Directory-backed blob store; references are `file://` URLs
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Opens (and creates if needed) a blob directory
    pub fn open(root: impl AsRef<Path>) -> CacheResult<Self> {
        let root = std::path::absolute(root.as_ref()).map_err(|e| {
            CacheError::InvalidPath(format!("{}: {}", root.as_ref().display(), e))
        })?;
        ensure_directory_exists(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &StoryId) -> PathBuf {
        self.root.join(format!("{}.audio", keys::escape(&keys::blob(id))))
    }

    fn reference(path: &Path) -> CacheResult<BlobRef> {
        Url::from_file_path(path)
            .map(|url| BlobRef::new(url.to_string()))
            .map_err(|_| CacheError::InvalidPath(path.display().to_string()))
    }
}

impl BlobStore for FileBlobStore {
    fn put(&self, id: &StoryId, bytes: &[u8]) -> CacheResult<BlobRef> {
        let path = self.path_for(id);
        write_atomic(&self.root, &path, bytes)?;
        log::info!("Stored {} bytes of audio for story {}", bytes.len(), id);
        Self::reference(&path)
    }

    fn locate(&self, id: &StoryId) -> CacheResult<Option<BlobRef>> {
        let path = self.path_for(id);
        if path.is_file() {
            Self::reference(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn read(&self, id: &StoryId) -> CacheResult<Option<Vec<u8>>> {
        let path = self.path_for(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Read { path, source: e }),
        }
    }

    fn delete(&self, id: &StoryId) -> CacheResult<()> {
        remove_if_exists(&self.path_for(id))
    }
}
