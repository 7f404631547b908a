//! Typed, best-effort cache

use crate::error::{CacheError, CacheResult};
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// JSON-typed view over a [`KeyValueStore`]
///
/// `get`, `set` and `remove` never fail: a broken disk degrades to a cache
/// miss and a warning in the log. Callers that must know a write landed use
/// [`CacheStore::try_set`].
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads and decodes `key`; unreadable or corrupt entries read as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.read(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Cache read failed for '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt cache entry '{}': {}", key, e);
                None
            }
        }
    }

    /// Best-effort write
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            log::warn!("Cache write failed for '{}': {}", key, e);
        }
    }

    /// Write that reports failure
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()> {
        let text = serde_json::to_string(value).map_err(|e| CacheError::Serialize {
            key: key.to_string(),
            source: e,
        })?;
        self.store.write(key, &text)?;
        log::debug!("Cached '{}' ({} bytes)", key, text.len());
        Ok(())
    }

    /// Best-effort delete
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            log::warn!("Cache delete failed for '{}': {}", key, e);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.store.read(key), Ok(Some(_)))
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}
