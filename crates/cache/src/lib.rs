//! Offline storage for StorySpark
//!
//! Two namespaces share one substrate:
//! - the typed [`CacheStore`] for catalog lists and download markers
//! - a [`BlobStore`] for fetched audio payloads
//!
//! Both are injected into services at construction; nothing here is global.

pub mod keys;

mod blob;
mod cache_store;
mod error;
mod store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use cache_store::CacheStore;
pub use error::{CacheError, CacheResult};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::path::Path;
use std::sync::Arc;

/// Opens the on-disk cache and blob store under `root`
pub fn open_dir(root: impl AsRef<Path>) -> CacheResult<(CacheStore, Arc<dyn BlobStore>)> {
    let root = root.as_ref();
    let kv = FileStore::open(root.join("kv"))?;
    let blobs = FileBlobStore::open(root.join("blobs"))?;
    Ok((CacheStore::new(Arc::new(kv)), Arc::new(blobs)))
}

/// In-memory cache and blob store
pub fn in_memory() -> (CacheStore, Arc<dyn BlobStore>) {
    (
        CacheStore::new(Arc::new(MemoryStore::new())),
        Arc::new(MemoryBlobStore::new()),
    )
}
