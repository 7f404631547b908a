//! Core domain types for StorySpark
//!
//! Shared by every other crate: story records, download markers, audio
//! reference validation and the error taxonomy.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    AudioRef, BlobRef, DownloadState, ReferenceError, ReferenceKind, Story, StoryId, Timestamp,
};
