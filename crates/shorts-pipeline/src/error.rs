//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("AI request failed: {0}")]
    AiFailed(String),

    #[error("Invalid AI response: {0}")]
    InvalidAiResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Segment selection failed: {0}")]
    SelectionFailed(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] shorts_catalog::CatalogError),

    #[error("Media error: {0}")]
    Media(#[from] shorts_media::MediaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn ai_failed(msg: impl Into<String>) -> Self {
        Self::AiFailed(msg.into())
    }

    pub fn invalid_ai_response(msg: impl Into<String>) -> Self {
        Self::InvalidAiResponse(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn selection_failed(msg: impl Into<String>) -> Self {
        Self::SelectionFailed(msg.into())
    }
}
