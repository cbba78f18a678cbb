//! Rendered clips and their persisted artifact names.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extension of rendered clip files.
pub const CLIP_EXTENSION: &str = "mp4";

/// A successfully rendered clip on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderedClip {
    /// Source catalog video ID
    pub video_id: String,
    /// 1-based clip number within the source video
    pub clip_number: u32,
    pub path: PathBuf,
    /// Seconds; the requested duration capped by the segment span
    pub duration: f64,
}

/// Stem shared by a clip and its metadata file: `<video_id>_clip_<n>`.
pub fn clip_stem(video_id: &str, clip_number: u32) -> String {
    format!("{}_clip_{}", video_id, clip_number)
}

/// `<video_id>_clip_<n>.mp4`
pub fn clip_file_name(video_id: &str, clip_number: u32) -> String {
    format!("{}.{}", clip_stem(video_id, clip_number), CLIP_EXTENSION)
}

/// `<video_id>_clip_<n>_metadata.json`
pub fn metadata_file_name(video_id: &str, clip_number: u32) -> String {
    format!("{}_metadata.json", clip_stem(video_id, clip_number))
}
