//! Run orchestration: search, fetch, select, render, annotate, clean up.
//!
//! Everything runs sequentially, one candidate and one segment at a time.
//! Stage failures are logged and skipped; the only early stop is an empty
//! search result or a missing media toolkit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use shorts_catalog::{VideoCatalog, YoutubeCatalog};
use shorts_media::{
    ClipRenderer, FfmpegRenderer, FfprobeProbe, MediaFetcher, MediaProbe, RenderOutcome,
    RenderRequest, YtDlpFetcher,
};
use shorts_models::{OutputFormat, RenderedClip, SearchOrder, VideoCandidate};
use tokio::fs;
use tracing::{info, warn, Instrument};

use crate::artifacts::{clean_temp_dir, write_metadata, OutputLayout};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::gemini::{GeminiClient, GenerativeClient};
use crate::logging::RunLogger;
use crate::metadata::{
    GenerativeMetadataSource, MetadataContext, MetadataGenerator, MetadataSource, TemplateMetadataSource,
};
use crate::segments::{
    GenerativeSegmentSource, SegmentSelector, SegmentSource, SharedRng, UniformSegmentSource,
};

/// Default number of clips per run.
pub const DEFAULT_NUM_CLIPS: u32 = 3;
/// Default requested clip length in seconds.
pub const DEFAULT_CLIP_DURATION: f64 = 30.0;

/// One pipeline run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub topic: String,
    /// Clip quota for the whole run
    pub num_clips: u32,
    /// Requested clip length; capped by the format's maximum
    pub clip_duration: f64,
    pub output_format: OutputFormat,
    pub order: SearchOrder,
    pub max_results: u32,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    /// Leave downloaded sources in `temp_dir`
    pub keep_temp: bool,
}

impl RunRequest {
    /// Clip length actually rendered, never above the platform limit.
    pub fn effective_clip_duration(&self) -> f64 {
        self.clip_duration.min(self.output_format.max_duration())
    }
}

/// A clip and its metadata file, both persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ProducedClip {
    pub clip: RenderedClip,
    pub metadata_path: PathBuf,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub topic: String,
    pub clips: Vec<ProducedClip>,
    /// Candidates the run started fetching
    pub candidates_considered: usize,
    /// Candidates dropped on fetch failure or with no usable segments
    pub candidates_skipped: usize,
    /// Rendering stopped because FFmpeg or ffprobe is missing
    pub toolkit_unavailable: bool,
    /// The catalog refused the search: quota exhausted or key rejected
    pub catalog_rejected: bool,
}

impl RunReport {
    fn new(logger: &RunLogger) -> Self {
        Self {
            run_id: logger.run_id().to_string(),
            topic: logger.topic().to_string(),
            clips: Vec::new(),
            candidates_considered: 0,
            candidates_skipped: 0,
            toolkit_unavailable: false,
            catalog_rejected: false,
        }
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}

/// Ties the stages together.
pub struct Orchestrator {
    catalog: Arc<dyn VideoCatalog>,
    fetcher: Arc<dyn MediaFetcher>,
    selector: SegmentSelector,
    renderer: Arc<dyn ClipRenderer>,
    metadata: MetadataGenerator,
}

enum SegmentStep {
    Produced(ProducedClip),
    Skipped,
    ToolkitUnavailable,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        fetcher: Arc<dyn MediaFetcher>,
        selector: SegmentSelector,
        renderer: Arc<dyn ClipRenderer>,
        metadata: MetadataGenerator,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            selector,
            renderer,
            metadata,
        }
    }

    /// Wire the production components from configuration.
    ///
    /// Without a Gemini key both segment selection and metadata use their fallbacks.
    pub fn from_config(config: &PipelineConfig, rng: SharedRng) -> PipelineResult<Self> {
        let youtube_key = config
            .youtube_api_key
            .clone()
            .ok_or_else(|| PipelineError::config_error("YouTube API key is not set"))?;
        let catalog = YoutubeCatalog::new(youtube_key, &config.catalog)?;

        let probe: Arc<dyn MediaProbe> = Arc::new(FfprobeProbe);
        let fallback_segments: Arc<dyn SegmentSource> =
            Arc::new(UniformSegmentSource::new(Arc::clone(&probe), Arc::clone(&rng)));

        let (segment_primary, metadata_primary) = match &config.gemini_api_key {
            Some(key) => {
                let client: Arc<dyn GenerativeClient> =
                    Arc::new(GeminiClient::new(key.clone(), config.gemini.clone())?);
                let segments: Arc<dyn SegmentSource> =
                    Arc::new(GenerativeSegmentSource::new(Arc::clone(&client), rng));
                let metadata: Arc<dyn MetadataSource> =
                    Arc::new(GenerativeMetadataSource::new(client));
                (Some(segments), Some(metadata))
            }
            None => {
                info!("Gemini API key not set, using fallback segment selection and metadata");
                (None, None)
            }
        };

        let mut renderer = FfmpegRenderer::detect(config.caption_style.clone(), config.encoding.clone())
            .with_probe(probe);
        if let Some(secs) = config.render_timeout_secs {
            renderer = renderer.with_timeout(secs);
        }

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(YtDlpFetcher::new(config.fetcher.clone())),
            SegmentSelector::new(segment_primary, fallback_segments),
            Arc::new(renderer),
            MetadataGenerator::new(metadata_primary, Arc::new(TemplateMetadataSource)),
        ))
    }

    /// Run the pipeline. Never fails; the report says what was produced.
    pub async fn run(&self, request: &RunRequest) -> RunReport {
        let logger = RunLogger::new(&request.topic);
        let span = logger.create_span();
        self.run_logged(request, &logger).instrument(span).await
    }

    async fn run_logged(&self, request: &RunRequest, logger: &RunLogger) -> RunReport {
        let mut report = RunReport::new(logger);
        logger.log_start(&format!(
            "{} clips of {:.0}s for {}",
            request.num_clips,
            request.effective_clip_duration(),
            request.output_format
        ));

        for dir in [&request.output_dir, &request.temp_dir] {
            if let Err(e) = fs::create_dir_all(dir).await {
                logger.log_warning(&format!("Cannot create {}: {}", dir.display(), e));
            }
        }

        self.produce(request, logger, &mut report).await;

        if request.keep_temp {
            info!(dir = %request.temp_dir.display(), "Keeping temporary files");
        } else if same_dir(&request.temp_dir, &request.output_dir).await {
            logger.log_warning(&format!(
                "Temp directory {} is the output directory, skipping cleanup",
                request.temp_dir.display()
            ));
        } else {
            let removed = clean_temp_dir(&request.temp_dir).await;
            info!(dir = %request.temp_dir.display(), removed, "Cleaned temporary files");
        }

        logger.log_completion(&format!("{} clips created", report.clip_count()));
        report
    }

    async fn produce(&self, request: &RunRequest, logger: &RunLogger, report: &mut RunReport) {
        let candidates = match self
            .catalog
            .search(&request.topic, request.max_results, request.order)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) if e.is_quota_or_auth() => {
                report.catalog_rejected = true;
                logger.log_error(&format!(
                    "Catalog rejected the search, check the API key and quota: {}",
                    e
                ));
                Vec::new()
            }
            Err(e) => {
                logger.log_error(&format!("Catalog search failed: {}", e));
                Vec::new()
            }
        };

        if candidates.is_empty() {
            logger.log_error("No videos found for topic");
            return;
        }
        logger.log_progress(&format!("{} candidate videos", candidates.len()));

        let quota = request.num_clips as usize;
        let layout = OutputLayout::new(&request.output_dir);

        for candidate in &candidates {
            if report.clips.len() >= quota {
                break;
            }
            report.candidates_considered += 1;

            let media = match self.fetcher.fetch(candidate, &request.temp_dir).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(video_id = %candidate.id, "Fetch failed, skipping video: {}", e);
                    report.candidates_skipped += 1;
                    continue;
                }
            };

            let segments = self.selector.select(candidate, &media).await;
            if segments.is_empty() {
                warn!(video_id = %candidate.id, "No usable segments, skipping video");
                report.candidates_skipped += 1;
                continue;
            }

            for (index, segment) in segments.iter().enumerate() {
                if report.clips.len() >= quota {
                    break;
                }

                let clip_number = index as u32 + 1;
                let caption = if segment.caption.trim().is_empty() {
                    format!("Check out this {} content!", request.topic)
                } else {
                    segment.caption.clone()
                };

                let render = RenderRequest {
                    video_id: candidate.id.clone(),
                    clip_number,
                    source: media.clone(),
                    segment: segment.clone(),
                    requested_duration: request.effective_clip_duration(),
                    target_aspect: request.output_format.aspect_ratio(),
                    target_resolution: request.output_format.resolution(),
                    caption,
                    output: layout.clip_path(&candidate.id, clip_number),
                };

                match self.render_and_annotate(candidate, &render, request, &layout).await {
                    SegmentStep::Produced(produced) => {
                        info!(
                            video_id = %candidate.id,
                            clip = clip_number,
                            path = %produced.clip.path.display(),
                            "Clip created"
                        );
                        report.clips.push(produced);
                    }
                    SegmentStep::Skipped => {}
                    SegmentStep::ToolkitUnavailable => {
                        logger.log_error("FFmpeg/ffprobe not available, no clips can be rendered");
                        report.toolkit_unavailable = true;
                        return;
                    }
                }
            }
        }

        if report.clips.len() < quota {
            logger.log_warning(&format!(
                "Only {} of {} clips created",
                report.clips.len(),
                quota
            ));
        }
    }

    async fn render_and_annotate(
        &self,
        candidate: &VideoCandidate,
        render: &RenderRequest,
        request: &RunRequest,
        layout: &OutputLayout,
    ) -> SegmentStep {
        let clip = match self.renderer.render(render).await {
            RenderOutcome::Rendered(clip) => clip,
            RenderOutcome::ToolkitUnavailable { .. } => return SegmentStep::ToolkitUnavailable,
            RenderOutcome::RenderFailed { reason, .. } => {
                warn!(
                    video_id = %candidate.id,
                    clip = render.clip_number,
                    "Render failed, trying next segment: {}", reason
                );
                return SegmentStep::Skipped;
            }
        };

        let ctx = MetadataContext {
            candidate,
            segment: &render.segment,
            caption: &render.caption,
            duration: clip.duration,
            format: request.output_format,
        };
        let metadata = self.metadata.generate(&ctx).await;

        let metadata_path = layout.metadata_path(&candidate.id, render.clip_number);
        if let Err(e) = write_metadata(&metadata_path, &metadata).await {
            warn!(
                video_id = %candidate.id,
                clip = render.clip_number,
                "Failed to write metadata, discarding clip: {}", e
            );
            if let Err(e) = fs::remove_file(&clip.path).await {
                warn!(path = %clip.path.display(), "Failed to remove orphaned clip: {}", e);
            }
            return SegmentStep::Skipped;
        }

        SegmentStep::Produced(ProducedClip { clip, metadata_path })
    }
}

/// Whether two directories resolve to the same place on disk.
async fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(format: OutputFormat, clip_duration: f64) -> RunRequest {
        RunRequest {
            topic: "cats".to_string(),
            num_clips: 1,
            clip_duration,
            output_format: format,
            order: SearchOrder::Trending,
            max_results: 5,
            output_dir: PathBuf::from("out"),
            temp_dir: PathBuf::from("tmp"),
            keep_temp: false,
        }
    }

    #[test]
    fn test_clip_duration_is_capped_by_format() {
        assert_eq!(request(OutputFormat::Tiktok, 120.0).effective_clip_duration(), 60.0);
        assert_eq!(request(OutputFormat::InstagramReels, 120.0).effective_clip_duration(), 90.0);
        assert_eq!(request(OutputFormat::YoutubeShorts, 30.0).effective_clip_duration(), 30.0);
    }

    #[test]
    fn test_from_config_requires_youtube_key() {
        let config = PipelineConfig::default();
        let result = Orchestrator::from_config(&config, crate::segments::shared_rng(Some(1)));
        assert!(matches!(result, Err(PipelineError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_same_dir_resolves_relative_segments() {
        let root = tempfile::TempDir::new().unwrap();
        let out = root.path().join("out");
        std::fs::create_dir_all(out.join("nested")).unwrap();

        assert!(same_dir(&out, &out.join("nested").join("..")).await);
        assert!(!same_dir(&out, &out.join("nested")).await);
        assert!(!same_dir(&out, &root.path().join("missing")).await);
    }
}
