//! Shared data models for the shorts clipper.
//!
//! This crate provides Serde-serializable types for:
//! - Catalog candidates and search ordering
//! - Scored segments and rendered clips
//! - Clip metadata written beside each clip
//! - Platform presets, caption style and encoding settings

pub mod candidate;
pub mod caption;
pub mod clip;
pub mod encoding;
pub mod format;
pub mod metadata;
pub mod search;
pub mod secret;
pub mod segment;

// Re-export common types
pub use candidate::{sort_by_views, VideoCandidate};
pub use caption::{CaptionPosition, CaptionStyle};
pub use clip::{clip_file_name, clip_stem, metadata_file_name, RenderedClip};
pub use encoding::EncodingConfig;
pub use format::{AspectRatio, OutputFormat, Resolution};
pub use metadata::ClipMetadata;
pub use search::SearchOrder;
pub use secret::ApiKey;
pub use segment::{rank_segments, Segment, SegmentError};
