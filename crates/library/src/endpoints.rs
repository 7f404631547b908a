//! Backend URL layout

use storyspark_config::NetworkConfig;
use storyspark_core::{AppError, AudioRef, Result, StoryId};
use url::Url;

/// Where the catalog and authenticated story routes live
///
/// The base URL doubles as the origin root-relative audio references are
/// resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    catalog: Url,
    user_stories: Url,
}

impl Endpoints {
    pub fn new(base: &str, catalog_path: &str, user_stories_path: &str) -> Result<Self> {
        let invalid = |reference: &str, e: url::ParseError| AppError::InvalidReference {
            reference: reference.to_string(),
            reason: e.to_string(),
        };

        let base_url = Url::parse(base).map_err(|e| invalid(base, e))?;
        let catalog = base_url
            .join(catalog_path)
            .map_err(|e| invalid(catalog_path, e))?;
        let user_stories = base_url
            .join(user_stories_path)
            .map_err(|e| invalid(user_stories_path, e))?;

        Ok(Self {
            base: base_url,
            catalog,
            user_stories,
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            &config.catalog_path,
            &config.user_stories_path,
        )
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn catalog(&self) -> Url {
        self.catalog.clone()
    }

    pub fn user_stories(&self) -> Url {
        self.user_stories.clone()
    }

    /// `<user_stories>/<id>`, with the id percent-encoded as one segment
    pub fn user_story(&self, id: &StoryId) -> Url {
        let mut url = self.user_stories.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }

    /// Validates and resolves an audio reference against the base URL
    pub fn resolve_audio(&self, raw: &str) -> Result<Url> {
        let audio = AudioRef::parse(raw)?;
        Ok(audio.resolve(&self.base)?)
    }
}
