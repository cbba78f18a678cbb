//! Scored time ranges within a media file.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A scored time range considered for clipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// Start in seconds from the beginning of the source
    pub start_time: f64,
    /// End in seconds, always greater than `start_time`
    pub end_time: f64,
    /// Ranking heuristic in [0, 1]
    pub engagement_score: f64,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SegmentError {
    #[error("Segment start must be a non-negative number, got {0}")]
    InvalidStart(f64),

    #[error("Segment end ({end}) must be after start ({start})")]
    EmptyRange { start: f64, end: f64 },
}

impl Segment {
    /// Build a segment, rejecting empty or negative ranges and clamping the score.
    pub fn new(
        start_time: f64,
        end_time: f64,
        engagement_score: f64,
        caption: impl Into<String>,
    ) -> Result<Self, SegmentError> {
        if !start_time.is_finite() || start_time < 0.0 {
            return Err(SegmentError::InvalidStart(start_time));
        }
        if !end_time.is_finite() || end_time <= start_time {
            return Err(SegmentError::EmptyRange {
                start: start_time,
                end: end_time,
            });
        }

        let engagement_score = if engagement_score.is_nan() {
            0.0
        } else {
            engagement_score.clamp(0.0, 1.0)
        };

        Ok(Self {
            start_time,
            end_time,
            engagement_score,
            caption: caption.into(),
        })
    }

    /// Length of the range in seconds.
    pub fn span(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Clip length when `requested` seconds are asked for: never longer than the segment.
    pub fn effective_duration(&self, requested: f64) -> f64 {
        requested.min(self.span())
    }

    /// End of the rendered sub-range for a requested duration.
    pub fn clip_end(&self, requested: f64) -> f64 {
        self.start_time + self.effective_duration(requested)
    }
}

/// Order segments by engagement score, highest first.
pub fn rank_segments(segments: &mut [Segment]) {
    segments.sort_by(|a, b| b.engagement_score.total_cmp(&a.engagement_score));
}
