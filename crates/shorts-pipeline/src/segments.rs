//! Segment selection: a generative source with a uniform fallback.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use shorts_media::MediaProbe;
use shorts_models::{rank_segments, Segment, VideoCandidate};
use tracing::{debug, error, info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::gemini::GenerativeClient;

/// Lowest score handed out when none is known.
pub const FALLBACK_SCORE_MIN: f64 = 0.7;
/// Highest score handed out when none is known.
pub const FALLBACK_SCORE_MAX: f64 = 1.0;
/// Target width of a uniform bucket, in seconds.
pub const BUCKET_SECONDS: f64 = 10.0;
/// Uniform partitioning never produces fewer buckets than this.
pub const MIN_BUCKETS: usize = 5;
/// Caption used when the model leaves one out.
pub const DEFAULT_SEGMENT_CAPTION: &str = "Check out this highlight!";

/// Random source shared by the segment sources.
pub type SharedRng = Arc<Mutex<StdRng>>;

/// Seeded for reproducible runs, OS entropy otherwise.
pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Arc::new(Mutex::new(rng))
}

fn random_score(rng: &SharedRng) -> f64 {
    let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    rng.random_range(FALLBACK_SCORE_MIN..=FALLBACK_SCORE_MAX)
}

/// Produces candidate segments for a fetched video.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn segments(&self, candidate: &VideoCandidate, media: &Path) -> PipelineResult<Vec<Segment>>;
}

/// Asks a generative model for the most engaging parts of a video.
pub struct GenerativeSegmentSource {
    client: Arc<dyn GenerativeClient>,
    rng: SharedRng,
}

impl GenerativeSegmentSource {
    pub fn new(client: Arc<dyn GenerativeClient>, rng: SharedRng) -> Self {
        Self { client, rng }
    }

    fn build_prompt(candidate: &VideoCandidate) -> String {
        format!(
            r#"You are an expert at finding the most engaging moments in online videos.

Video title: {title}
Channel: {channel}
Description:
{description}

Identify 3 to 5 segments of this video, each 30 to 60 seconds long, that would
make the most engaging short-form vertical clips.

Return ONLY a JSON object with this schema:
{{
  "segments": [
    {{
      "start_time": 0.0,
      "end_time": 45.0,
      "engagement_score": 0.9,
      "caption": "Short catchy caption"
    }}
  ]
}}

- start_time and end_time are seconds from the start of the video.
- engagement_score is between 0 and 1.
"#,
            title = candidate.title,
            channel = candidate.channel,
            description = candidate.description,
        )
    }

    /// Turn a model answer into segments, dropping malformed entries.
    fn parse_segments(&self, value: &Value) -> PipelineResult<Vec<Segment>> {
        let entries = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("segments") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(PipelineError::invalid_ai_response(
                        "Expected a \"segments\" array",
                    ))
                }
            },
            _ => {
                return Err(PipelineError::invalid_ai_response(
                    "Expected a JSON object or array",
                ))
            }
        };

        let mut segments = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let (Some(start), Some(end)) = (number_field(entry, "start_time"), number_field(entry, "end_time")) else {
                debug!(index, "Dropping segment without start_time/end_time");
                continue;
            };

            let score = number_field(entry, "engagement_score").unwrap_or_else(|| random_score(&self.rng));
            let caption = entry
                .get("caption")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_SEGMENT_CAPTION);

            match Segment::new(start, end, score, caption) {
                Ok(segment) => segments.push(segment),
                Err(e) => debug!(index, "Dropping malformed segment: {}", e),
            }
        }

        Ok(segments)
    }
}

/// Numbers may come back as JSON numbers or numeric strings.
fn number_field(entry: &Value, key: &str) -> Option<f64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl SegmentSource for GenerativeSegmentSource {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn segments(&self, candidate: &VideoCandidate, _media: &Path) -> PipelineResult<Vec<Segment>> {
        let prompt = Self::build_prompt(candidate);
        let value = self.client.generate_json(&prompt).await?;
        self.parse_segments(&value)
    }
}

/// Splits the whole video into equal buckets with random scores.
pub struct UniformSegmentSource {
    probe: Arc<dyn MediaProbe>,
    rng: SharedRng,
}

impl UniformSegmentSource {
    pub fn new(probe: Arc<dyn MediaProbe>, rng: SharedRng) -> Self {
        Self { probe, rng }
    }
}

/// Partition `[0, duration)` into `max(5, floor(duration / 10))` equal buckets.
///
/// The last bucket ends exactly at `duration` so the buckets tile the range.
pub fn uniform_segments(duration: f64, rng: &SharedRng) -> PipelineResult<Vec<Segment>> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PipelineError::selection_failed(format!(
            "Cannot partition a video of duration {}",
            duration
        )));
    }

    let bucket_count = ((duration / BUCKET_SECONDS).floor() as usize).max(MIN_BUCKETS);
    let width = duration / bucket_count as f64;

    (0..bucket_count)
        .map(|i| {
            let start = i as f64 * width;
            let end = if i + 1 == bucket_count {
                duration
            } else {
                (i + 1) as f64 * width
            };
            Segment::new(start, end, random_score(rng), format!("Interesting moment {}", i + 1))
                .map_err(|e| PipelineError::selection_failed(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl SegmentSource for UniformSegmentSource {
    fn name(&self) -> &'static str {
        "uniform"
    }

    async fn segments(&self, _candidate: &VideoCandidate, media: &Path) -> PipelineResult<Vec<Segment>> {
        let info = self.probe.probe(media).await?;
        uniform_segments(info.duration, &self.rng)
    }
}

/// Picks segments from the primary source, falling back when it fails or finds none.
///
/// Never fails: an empty list means no usable content.
pub struct SegmentSelector {
    primary: Option<Arc<dyn SegmentSource>>,
    fallback: Arc<dyn SegmentSource>,
}

impl SegmentSelector {
    pub fn new(primary: Option<Arc<dyn SegmentSource>>, fallback: Arc<dyn SegmentSource>) -> Self {
        Self { primary, fallback }
    }

    /// Ranked segments, highest engagement first.
    pub async fn select(&self, candidate: &VideoCandidate, media: &Path) -> Vec<Segment> {
        if let Some(primary) = &self.primary {
            match primary.segments(candidate, media).await {
                Ok(segments) if !segments.is_empty() => {
                    info!(
                        video_id = %candidate.id,
                        source = primary.name(),
                        count = segments.len(),
                        "Selected segments"
                    );
                    return ranked(segments);
                }
                Ok(_) => {
                    info!(video_id = %candidate.id, source = primary.name(), "No segments returned, using fallback");
                }
                Err(e) => {
                    warn!(video_id = %candidate.id, source = primary.name(), "Segment source failed, using fallback: {}", e);
                }
            }
        }

        match self.fallback.segments(candidate, media).await {
            Ok(segments) => {
                info!(
                    video_id = %candidate.id,
                    source = self.fallback.name(),
                    count = segments.len(),
                    "Selected segments"
                );
                ranked(segments)
            }
            Err(e) => {
                error!(video_id = %candidate.id, source = self.fallback.name(), "Fallback segment source failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn ranked(mut segments: Vec<Segment>) -> Vec<Segment> {
    rank_segments(&mut segments);
    segments
}
