//! YouTube Data API v3 response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shorts_models::VideoCandidate;

/// `search.list` response.
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    /// Absent for channel and playlist results
    pub video_id: Option<String>,
}

/// `videos.list` response.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Counters arrive as decimal strings and may be hidden by the uploader.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
}

/// API error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

fn parse_count(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl From<VideoResource> for VideoCandidate {
    fn from(video: VideoResource) -> Self {
        let thumbnail_url = video
            .snippet
            .thumbnails
            .high
            .or(video.snippet.thumbnails.default)
            .map(|t| t.url);

        VideoCandidate {
            id: video.id,
            title: video.snippet.title,
            channel: video.snippet.channel_title,
            description: video.snippet.description,
            view_count: parse_count(&video.statistics.view_count),
            like_count: parse_count(&video.statistics.like_count),
            comment_count: parse_count(&video.statistics.comment_count),
            published_at: video.snippet.published_at,
            duration: video.content_details.duration,
            thumbnail_url,
        }
    }
}
