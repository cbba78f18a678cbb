//! Client for the YouTube Data API.
//!
//! Finds candidate videos for a topic with a `search.list` call followed by a
//! `videos.list` lookup for statistics, then ranks them by view count.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CatalogConfig, VideoCatalog, YoutubeCatalog};
pub use error::{CatalogError, CatalogResult};
