//! Catalog search results.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A video returned by catalog search, not yet fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoCandidate {
    /// Catalog video ID (e.g. "dQw4w9WgXcQ")
    pub id: String,
    pub title: String,
    pub channel: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// ISO-8601 duration as reported by the catalog (e.g. "PT4M13S")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl VideoCandidate {
    /// Create a candidate with the required fields; counters start at zero.
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel: channel.into(),
            description: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            published_at: None,
            duration: None,
            thumbnail_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_views(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    /// Watch page URL used by the fetcher.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Sort candidates by view count, most viewed first.
pub fn sort_by_views(candidates: &mut [VideoCandidate]) {
    candidates.sort_by(|a, b| b.view_count.cmp(&a.view_count));
}
