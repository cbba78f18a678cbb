//! Catalog search ordering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ordering requested from the catalog. Results are re-sorted by views regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    #[default]
    Trending,
    Recent,
    Relevance,
    Rating,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Trending => "trending",
            SearchOrder::Recent => "recent",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Rating => "rating",
        }
    }

    /// Value of the YouTube Data API `order` parameter.
    pub fn api_param(&self) -> &'static str {
        match self {
            SearchOrder::Trending => "viewCount",
            SearchOrder::Recent => "date",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Rating => "rating",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = SearchOrderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(SearchOrder::Trending),
            "recent" => Ok(SearchOrder::Recent),
            "relevance" => Ok(SearchOrder::Relevance),
            "rating" => Ok(SearchOrder::Rating),
            _ => Err(SearchOrderParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown search order: {0}")]
pub struct SearchOrderParseError(String);
