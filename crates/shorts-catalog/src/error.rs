//! Catalog client error types.

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog request failed with {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs carry the API key.
        CatalogError::Network(e.without_url())
    }
}

impl CatalogError {
    /// Quota exhaustion or rejected key.
    pub fn is_quota_or_auth(&self) -> bool {
        matches!(self, CatalogError::RequestFailed { status: 400 | 401 | 403, .. })
    }
}
