//! Pipeline configuration.
//!
//! Everything is read from the environment once at start-up and then passed
//! into component constructors.

use std::path::PathBuf;

use shorts_catalog::CatalogConfig;
use shorts_media::FetcherConfig;
use shorts_models::{ApiKey, CaptionPosition, CaptionStyle, EncodingConfig, SearchOrder};

use crate::gemini::GeminiConfig;

/// Default directory for downloaded sources.
pub const DEFAULT_TEMP_DIR: &str = "./temp";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// YouTube Data API key; required to search
    pub youtube_api_key: Option<ApiKey>,
    /// Gemini key; without it segment and metadata generation use the fallbacks
    pub gemini_api_key: Option<ApiKey>,
    pub catalog: CatalogConfig,
    pub gemini: GeminiConfig,
    pub fetcher: FetcherConfig,
    pub search_order: SearchOrder,
    /// Shared directory for downloaded sources, emptied after each run
    pub temp_dir: PathBuf,
    pub caption_style: CaptionStyle,
    pub encoding: EncodingConfig,
    /// Kill a single FFmpeg render after this many seconds
    pub render_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            gemini_api_key: None,
            catalog: CatalogConfig::default(),
            gemini: GeminiConfig::default(),
            fetcher: FetcherConfig::default(),
            search_order: SearchOrder::default(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            caption_style: CaptionStyle::default(),
            encoding: EncodingConfig::default(),
            render_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = CaptionStyle::default();
        let caption_style = CaptionStyle {
            font: std::env::var("CAPTION_FONT").unwrap_or(defaults.font),
            font_size: std::env::var("CAPTION_FONT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.font_size),
            color: std::env::var("CAPTION_COLOR").unwrap_or(defaults.color),
            stroke_color: std::env::var("CAPTION_STROKE_COLOR").unwrap_or(defaults.stroke_color),
            stroke_width: std::env::var("CAPTION_STROKE_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.stroke_width),
            position: std::env::var("CAPTION_POSITION")
                .ok()
                .and_then(|s| s.parse::<CaptionPosition>().ok())
                .unwrap_or(defaults.position),
            width_ratio: defaults.width_ratio,
        };

        let mut encoding = EncodingConfig::default();
        if let Ok(preset) = std::env::var("RENDER_PRESET") {
            encoding.preset = preset;
        }
        if let Some(crf) = std::env::var("RENDER_CRF").ok().and_then(|s| s.parse().ok()) {
            encoding.crf = crf;
        }

        Self {
            youtube_api_key: ApiKey::from_env("YOUTUBE_API_KEY"),
            gemini_api_key: ApiKey::from_env("GEMINI_API_KEY"),
            catalog: CatalogConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            fetcher: FetcherConfig::from_env(),
            search_order: std::env::var("CLIPPER_SEARCH_ORDER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            temp_dir: std::env::var("CLIPPER_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMP_DIR)),
            caption_style,
            encoding,
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
