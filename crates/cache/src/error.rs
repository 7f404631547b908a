//! Error types for cache and blob storage

use std::path::PathBuf;
use storyspark_core::AppError;
use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by the storage substrate
///
/// The typed [`crate::CacheStore`] API swallows these; only `try_set` and the
/// blob store surface them.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create cache directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache path cannot be used: {0}")]
    InvalidPath(String),

    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Converts into the cross-crate taxonomy for a write against `key`
    pub fn into_write_failure(self, key: &str) -> AppError {
        AppError::CacheWriteFailed {
            key: key.to_string(),
            reason: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_conversion() {
        let err = CacheError::Unavailable("lock poisoned".to_string());
        let app = err.into_write_failure("download:s1");
        assert!(matches!(
            app,
            AppError::CacheWriteFailed { ref key, .. } if key == "download:s1"
        ));
    }
}
