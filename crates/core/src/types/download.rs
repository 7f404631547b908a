//! Download (materialisation) records

use crate::types::{StoryId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locally resolvable reference to a stored audio blob
///
/// Always an absolute URL (e.g. `file:///…`) so it can be handed straight to
/// the playback controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker proving a story's audio has been fetched and stored locally
///
/// Existence of a `DownloadState` for an id is what "downloaded" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadState {
    pub story_id: StoryId,
    pub blob_ref: BlobRef,
    pub downloaded_at: Timestamp,
    #[serde(default)]
    pub size_bytes: u64,
}

impl DownloadState {
    /// Creates a marker stamped with the current time
    pub fn new(story_id: StoryId, blob_ref: BlobRef, size_bytes: u64) -> Self {
        Self {
            story_id,
            blob_ref,
            downloaded_at: Timestamp::now(),
            size_bytes,
        }
    }
}
