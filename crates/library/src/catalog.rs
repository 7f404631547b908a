//! Story catalog with offline fallback

use crate::download::MediaDownloadManager;
use crate::endpoints::Endpoints;
use crate::remote::{remote_error, Remote};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use storyspark_cache::{keys, CacheStore};
use storyspark_core::{AppError, Result, Story, StoryId};
use storyspark_network::{HttpRequest, TokenProvider, Transport};

#[derive(Deserialize)]
struct StoriesEnvelope {
    #[serde(default)]
    stories: Vec<Story>,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: Story,
}

/// Supplies story lists, live when possible and cached otherwise
///
/// The public catalog never fails: network trouble degrades to the last
/// cached list. Authenticated operations surface their errors.
pub struct StoryCatalogService {
    remote: Remote,
    endpoints: Endpoints,
    cache: CacheStore,
    downloads: Arc<MediaDownloadManager>,
    tokens: Arc<dyn TokenProvider>,
}

impl StoryCatalogService {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        cache: CacheStore,
        downloads: Arc<MediaDownloadManager>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            remote: Remote::new(transport),
            endpoints,
            cache,
            downloads,
            tokens,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.remote = self.remote.with_timeout(timeout);
        self
    }

    pub fn downloads(&self) -> &Arc<MediaDownloadManager> {
        &self.downloads
    }

    /// Fetches the catalog, refreshing the cache; on any failure returns the
    /// cached list (or nothing) instead of an error
    pub async fn fetch_catalog(&self) -> Vec<Story> {
        match self.fetch_remote_catalog().await {
            Ok(mut stories) => {
                for story in &mut stories {
                    story.is_downloaded |= self.downloads.is_downloaded(&story.id);
                }
                self.cache.set(keys::CATALOG, &stories);
                log::debug!("Fetched {} stories", stories.len());
                stories
            }
            Err(e) => {
                let cached = self.cached_stories();
                log::warn!(
                    "Catalog fetch failed ({}); serving {} cached stories",
                    e,
                    cached.len()
                );
                cached
            }
        }
    }

    async fn fetch_remote_catalog(&self) -> Result<Vec<Story>> {
        let response = self
            .remote
            .execute(HttpRequest::get(self.endpoints.catalog()))
            .await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        Ok(response.json()?)
    }

    /// Last fetched or locally mutated list
    pub fn cached_stories(&self) -> Vec<Story> {
        self.cache.get(keys::CATALOG).unwrap_or_default()
    }

    pub fn downloaded_stories(&self) -> Vec<Story> {
        self.cached_stories()
            .into_iter()
            .filter(|s| s.is_downloaded)
            .collect()
    }

    /// Sets `isDownloaded` on the cached entry; unknown ids change nothing
    pub fn mark_downloaded(&self, id: &StoryId) -> Vec<Story> {
        self.set_downloaded_flag(id, true)
    }

    pub fn unmark_downloaded(&self, id: &StoryId) -> Vec<Story> {
        self.set_downloaded_flag(id, false)
    }

    fn set_downloaded_flag(&self, id: &StoryId, downloaded: bool) -> Vec<Story> {
        let mut stories = self.cached_stories();
        if let Some(story) = stories.iter_mut().find(|s| &s.id == id) {
            story.is_downloaded = downloaded;
        }
        self.cache.set(keys::CATALOG, &stories);
        stories
    }

    /// Downloads the story's audio and records it in the cached list
    ///
    /// Stories not yet in the list (a user's own, say) are added so they
    /// show up among the downloaded ones.
    pub async fn save_for_offline(&self, story: &Story) -> bool {
        let audio_ref = story.audio_ref.as_deref().unwrap_or_default();
        if !self.downloads.download(&story.id, audio_ref).await {
            return false;
        }

        let mut stories = self.cached_stories();
        match stories.iter_mut().find(|s| s.id == story.id) {
            Some(existing) => existing.is_downloaded = true,
            None => {
                let mut added = story.clone();
                added.is_downloaded = true;
                stories.push(added);
            }
        }
        self.cache.set(keys::CATALOG, &stories);
        true
    }

    /// Drops the local audio and clears the flag
    pub fn remove_offline(&self, id: &StoryId) -> Vec<Story> {
        self.downloads.remove(id);
        self.unmark_downloaded(id)
    }

    /// Local copy if one exists, otherwise the live reference
    pub fn resolve_playback_ref(&self, story: &Story) -> Option<String> {
        self.downloads
            .cached_ref(&story.id)
            .map(|r| r.into_string())
            .or_else(|| story.audio_ref.clone().filter(|r| !r.trim().is_empty()))
    }

    /// Stories owned by the signed-in user
    pub async fn list_user_stories(&self) -> Result<Vec<Story>> {
        let request = self.authorized(HttpRequest::get(self.endpoints.user_stories()))?;
        let response = self.remote.execute(request).await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        let envelope: StoriesEnvelope = response.json()?;
        Ok(envelope.stories)
    }

    pub async fn get_user_story(&self, id: &StoryId) -> Result<Story> {
        let request = self.authorized(HttpRequest::get(self.endpoints.user_story(id)))?;
        let response = self.remote.execute(request).await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        let envelope: StoryEnvelope = response.json()?;
        Ok(envelope.story)
    }

    /// Deletes the story remotely, then prunes it from the cached list and
    /// drops any offline copy
    pub async fn delete_story(&self, id: &StoryId) -> Result<()> {
        let request = self.authorized(HttpRequest::delete(self.endpoints.user_story(id)))?;
        let response = self.remote.execute(request).await?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }

        let mut stories = self.cached_stories();
        let before = stories.len();
        stories.retain(|s| &s.id != id);
        if stories.len() != before {
            self.cache.set(keys::CATALOG, &stories);
        }
        if self.downloads.is_downloaded(id) {
            self.downloads.remove(id);
        }

        log::info!("Deleted story {}", id);
        Ok(())
    }

    /// Attaches the bearer token, failing before any request without one
    fn authorized(&self, request: HttpRequest) -> Result<HttpRequest> {
        self.tokens
            .bearer_token()
            .map(|token| request.with_bearer(token))
            .ok_or(AppError::Unauthenticated)
    }
}
