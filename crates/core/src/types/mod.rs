//! Domain types for StorySpark
//!
//! - `story`: Story records and their identifiers
//! - `download`: explicit download markers and blob references
//! - `audio_ref`: audio reference validation
//! - `common`: timestamps

mod audio_ref;
mod common;
mod download;
mod story;

pub use audio_ref::{AudioRef, ReferenceError, ReferenceKind};
pub use common::Timestamp;
pub use download::{BlobRef, DownloadState};
pub use story::{Story, StoryId};
