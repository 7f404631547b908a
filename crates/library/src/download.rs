//! Fetching audio once and keeping it for offline playback

use crate::endpoints::Endpoints;
use crate::remote::{remote_error, Remote};
use std::sync::Arc;
use std::time::Duration;
use storyspark_cache::{keys, BlobStore, CacheStore};
use storyspark_core::{AppError, BlobRef, DownloadState, Result, StoryId};
use storyspark_network::{HttpRequest, Transport};

/// Materialises story audio into the blob store
///
/// A story counts as downloaded exactly when its `DownloadState` marker
/// exists. The marker is written after the blob and only if the blob write
/// succeeded.
pub struct MediaDownloadManager {
    remote: Remote,
    endpoints: Endpoints,
    cache: CacheStore,
    blobs: Arc<dyn BlobStore>,
}

impl MediaDownloadManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        cache: CacheStore,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            remote: Remote::new(transport),
            endpoints,
            cache,
            blobs,
        }
    }

    /// Bounds every fetch; exceeding it reports `NetworkTimeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.remote = self.remote.with_timeout(timeout);
        self
    }

    /// Downloads and stores audio for `id`, reporting why it failed
    ///
    /// A malformed reference fails with `InvalidReference` before any
    /// request is made, and leaves existing downloads alone.
    pub async fn try_download(&self, id: &StoryId, audio_ref: &str) -> Result<DownloadState> {
        let url = self.endpoints.resolve_audio(audio_ref)?;
        log::debug!("Downloading audio for story {} from {}", id, url);

        let response = self.remote.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        if response.body.is_empty() {
            return Err(AppError::InvalidResponse {
                details: format!("empty audio payload for story {}", id),
            });
        }

        let blob_ref = self
            .blobs
            .put(id, &response.body)
            .map_err(|e| e.into_write_failure(&keys::blob(id)))?;

        let state = DownloadState::new(id.clone(), blob_ref, response.body.len() as u64);
        let marker_key = keys::download(id);
        if let Err(e) = self.cache.try_set(&marker_key, &state) {
            // Roll back so no blob exists without a marker, nor a marker
            // pointing at a blob that may have been replaced
            self.discard(id);
            return Err(e.into_write_failure(&marker_key));
        }

        log::info!(
            "Stored story {} for offline playback ({} bytes)",
            id,
            state.size_bytes
        );
        Ok(state)
    }

    /// Best-effort download: `true` means [`Self::cached_ref`] now succeeds
    pub async fn download(&self, id: &StoryId, audio_ref: &str) -> bool {
        match self.try_download(id, audio_ref).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Download of story {} failed: {}", id, e);
                false
            }
        }
    }

    /// Marker for `id`, if the story has been downloaded
    pub fn download_state(&self, id: &StoryId) -> Option<DownloadState> {
        self.cache.get(&keys::download(id))
    }

    pub fn is_downloaded(&self, id: &StoryId) -> bool {
        self.download_state(id).is_some()
    }

    /// Local reference to the stored audio, if it is still there
    pub fn cached_ref(&self, id: &StoryId) -> Option<BlobRef> {
        self.download_state(id)?;
        match self.blobs.locate(id) {
            Ok(Some(blob_ref)) => Some(blob_ref),
            Ok(None) => {
                log::warn!("Download marker for story {} has no blob; ignoring", id);
                None
            }
            Err(e) => {
                log::warn!("Could not locate blob for story {}: {}", id, e);
                None
            }
        }
    }

    /// Deletes the marker, then the blob
    pub fn remove(&self, id: &StoryId) {
        self.discard(id);
        log::info!("Removed offline copy of story {}", id);
    }

    fn discard(&self, id: &StoryId) {
        self.cache.remove(&keys::download(id));
        if let Err(e) = self.blobs.delete(id) {
            log::warn!("Could not delete blob for story {}: {}", id, e);
        }
    }
}
