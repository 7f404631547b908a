//! Story domain model

use crate::types::common::{deserialize_lenient_timestamp, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier for a story
///
/// The backend hands out integer ids while locally generated stories use
/// strings, so both forms are accepted and normalised to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Creates a story id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for StoryId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A narrated story as known to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default, alias = "age_group")]
    pub age_group: String,
    /// Human readable duration such as "5 minutes"
    #[serde(default, rename = "duration", alias = "durationLabel")]
    pub duration_label: String,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default, alias = "audio_path", alias = "audio_url", alias = "audioUrl")]
    pub audio_ref: Option<String>,
    #[serde(default, alias = "is_downloaded")]
    pub is_downloaded: bool,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "deserialize_lenient_timestamp"
    )]
    pub created_at: Option<Timestamp>,
}

impl Story {
    /// Creates a story with only the required fields populated
    pub fn new(id: impl Into<StoryId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            theme: String::new(),
            age_group: String::new(),
            duration_label: String::new(),
            text: String::new(),
            audio_ref: None,
            is_downloaded: false,
            created_at: None,
        }
    }

    /// Sets the audio reference
    pub fn with_audio_ref(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into());
        self
    }

    /// Sets the story text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the theme
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Returns true if the story has a non-blank audio reference
    pub fn has_audio(&self) -> bool {
        self.audio_ref
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_deserializes() {
        let story: Story = serde_json::from_str(r#"{"id": 1, "title": "A"}"#).expect("parse");
        assert_eq!(story.id, StoryId::new("1"));
        assert_eq!(story.title, "A");
        assert!(!story.is_downloaded);
        assert!(story.audio_ref.is_none());
    }

    #[test]
    fn test_backend_shape_deserializes() {
        let json = r#"{
            "id": 7,
            "title": "The Magical Forest",
            "content": "Once upon a time",
            "audio_path": "/static/audio/7.mp3",
            "theme": "Courage",
            "duration": "5 minutes",
            "age_group": "6-8",
            "language": "en",
            "created_at": "2024-03-01T10:00:00.123456",
            "user_id": 3
        }"#;
        let story: Story = serde_json::from_str(json).expect("parse");
        assert_eq!(story.text, "Once upon a time");
        assert_eq!(story.audio_ref.as_deref(), Some("/static/audio/7.mp3"));
        assert_eq!(story.age_group, "6-8");
        assert_eq!(story.duration_label, "5 minutes");
        assert!(story.created_at.is_some());
    }

    #[test]
    fn test_cache_roundtrip_keeps_flags() {
        let story = Story::new("s1", "Title").with_audio_ref("/a.mp3");
        let mut downloaded = story.clone();
        downloaded.is_downloaded = true;

        let json = serde_json::to_string(&downloaded).expect("serialize");
        assert!(json.contains("\"isDownloaded\":true"));
        assert!(json.contains("\"audioRef\""));

        let back: Story = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, downloaded);
    }

    #[test]
    fn test_unparseable_created_at_is_none() {
        let story: Story =
            serde_json::from_str(r#"{"id": "x", "created_at": "last tuesday"}"#).expect("parse");
        assert!(story.created_at.is_none());
    }

    #[test]
    fn test_has_audio() {
        assert!(!Story::new("a", "t").has_audio());
        assert!(!Story::new("a", "t").with_audio_ref("  ").has_audio());
        assert!(Story::new("a", "t").with_audio_ref("/x.mp3").has_audio());
    }
}
