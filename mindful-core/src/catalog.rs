//! Content references consumed by the widgets.

use serde::{Deserialize, Serialize};

/// Kind of content a like counter is attached to.
///
/// The string identifier is part of the persisted storage keys, so it should
/// not change once established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Podcast episode page
    Podcast,
    /// Blog article
    Blog,
}

impl ContentType {
    /// Get the string identifier used in storage keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Podcast => "podcast",
            Self::Blog => "blog",
        }
    }

    /// Parse a content type from its storage identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "podcast" => Some(Self::Podcast),
            "blog" => Some(Self::Blog),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of a catalog entry the audio player needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Episode identifier shown next to the title (e.g. "001")
    pub episode_id: String,
    /// Episode title, also used as the telemetry label
    pub title: String,
    /// URL of the audio file
    pub audio_url: String,
    /// Human-readable duration from the catalog (e.g. "15:30")
    pub duration_display: String,
}

impl EpisodeRef {
    /// Create a new episode reference
    pub fn new(
        episode_id: impl Into<String>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
        duration_display: impl Into<String>,
    ) -> Self {
        Self {
            episode_id: episode_id.into(),
            title: title.into(),
            audio_url: audio_url.into(),
            duration_display: duration_display.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_roundtrip_names() {
        assert_eq!(ContentType::Podcast.as_str(), "podcast");
        assert_eq!(ContentType::Blog.to_string(), "blog");
        assert_eq!(ContentType::parse("blog"), Some(ContentType::Blog));
        assert_eq!(ContentType::parse("ebook"), None);
    }

    #[test]
    fn test_episode_ref_new() {
        let episode = EpisodeRef::new(
            "001",
            "Não Pense Demais, Apenas Comece",
            "/audios/episode-1.mp3",
            "15:30",
        );

        assert_eq!(episode.episode_id, "001");
        assert_eq!(episode.audio_url, "/audios/episode-1.mp3");
        assert_eq!(episode.duration_display, "15:30");
    }
}
