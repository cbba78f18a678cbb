//! YouTube Data API v3 search client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shorts_models::{sort_by_views, ApiKey, SearchOrder, VideoCandidate};
use tracing::{debug, info};
use url::Url;

use crate::error::{CatalogError, CatalogResult};
use crate::types::{ErrorResponse, SearchListResponse, VideoListResponse};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default number of candidates per search.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// `search.list` caps `maxResults` at 50.
const API_MAX_RESULTS: u32 = 50;

/// Queries a video catalog for candidates matching a topic.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Up to `max_results` candidates, most viewed first whatever `order` is.
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        order: SearchOrder,
    ) -> CatalogResult<Vec<VideoCandidate>>;
}

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root, overridable for tests and proxies
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Candidates requested per search
    pub max_results: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("YOUTUBE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_results: std::env::var("YOUTUBE_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RESULTS),
        }
    }
}

/// Client for the YouTube Data API.
pub struct YoutubeCatalog {
    http: Client,
    api_key: ApiKey,
    base_url: Url,
}

impl YoutubeCatalog {
    /// Create a new catalog client.
    pub fn new(api_key: ApiKey, config: &CatalogConfig) -> CatalogResult<Self> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base)
            .map_err(|e| CatalogError::InvalidConfig(format!("base URL {}: {}", config.base_url, e)))?;

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, name: &str) -> CatalogResult<Url> {
        self.base_url
            .join(name)
            .map_err(|e| CatalogError::InvalidConfig(format!("endpoint {}: {}", name, e)))
    }

    async fn get<T: DeserializeOwned>(&self, name: &str, params: &[(&str, &str)]) -> CatalogResult<T> {
        let url = self.endpoint(name)?;
        debug!(endpoint = %url, "Calling catalog API");

        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.expose())])
            .send()
            .await?;

        parse_response(response).await
    }

    async fn search_ids(&self, query: &str, max_results: u32, order: SearchOrder) -> CatalogResult<Vec<String>> {
        let max_results = max_results.clamp(1, API_MAX_RESULTS).to_string();
        let response: SearchListResponse = self
            .get(
                "search",
                &[
                    ("part", "id,snippet"),
                    ("q", query),
                    ("maxResults", &max_results),
                    ("order", order.api_param()),
                    ("type", "video"),
                    ("videoDuration", "medium"),
                ],
            )
            .await?;

        let mut ids: Vec<String> = Vec::with_capacity(response.items.len());
        for id in response.items.into_iter().filter_map(|item| item.id.video_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn video_details(&self, ids: &[String]) -> CatalogResult<Vec<VideoCandidate>> {
        let joined = ids.join(",");
        let response: VideoListResponse = self
            .get(
                "videos",
                &[("part", "statistics,contentDetails,snippet"), ("id", &joined)],
            )
            .await?;

        Ok(response.items.into_iter().map(VideoCandidate::from).collect())
    }
}

#[async_trait]
impl VideoCatalog for YoutubeCatalog {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        order: SearchOrder,
    ) -> CatalogResult<Vec<VideoCandidate>> {
        info!(query = %query, max_results, order = %order, "Searching catalog");

        let ids = self.search_ids(query, max_results, order).await?;
        if ids.is_empty() {
            info!(query = %query, "Catalog search returned no videos");
            return Ok(Vec::new());
        }

        let mut candidates = self.video_details(&ids).await?;
        sort_by_views(&mut candidates);
        candidates.truncate(max_results as usize);

        info!(query = %query, count = candidates.len(), "Catalog search complete");
        Ok(candidates)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> CatalogResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(CatalogError::RequestFailed {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| CatalogError::InvalidResponse(e.to_string()))
}
