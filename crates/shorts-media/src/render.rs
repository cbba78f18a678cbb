//! Clip rendering: cut, reframe, caption and encode one segment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use shorts_models::{AspectRatio, CaptionStyle, EncodingConfig, RenderedClip, Resolution, Segment};
use tracing::{debug, error, info, warn};

use crate::caption::CaptionFile;
use crate::command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_filter_graph, VIDEO_OUTPUT_LABEL};
use crate::geometry::{plan_frame, FramePlan};
use crate::probe::{FfprobeProbe, MediaProbe};

/// Everything needed to render one clip.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub video_id: String,
    /// 1-based clip number within the source video
    pub clip_number: u32,
    pub source: PathBuf,
    pub segment: Segment,
    /// Seconds asked for; the rendered clip never runs past the segment end
    pub requested_duration: f64,
    pub target_aspect: AspectRatio,
    pub target_resolution: Resolution,
    /// Caption burned into the clip; blank means none
    pub caption: String,
    pub output: PathBuf,
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(RenderedClip),
    /// FFmpeg or ffprobe is missing; the source was not touched.
    ToolkitUnavailable { source: PathBuf },
    RenderFailed { source: PathBuf, reason: String },
}

impl RenderOutcome {
    pub fn clip(&self) -> Option<&RenderedClip> {
        match self {
            RenderOutcome::Rendered(clip) => Some(clip),
            _ => None,
        }
    }
}

/// Renders segments into clip files.
#[async_trait]
pub trait ClipRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> RenderOutcome;
}

/// [`ClipRenderer`] backed by FFmpeg.
///
/// Toolkit availability is checked once at construction; when FFmpeg or
/// ffprobe is missing every render is a no-op returning
/// [`RenderOutcome::ToolkitUnavailable`].
pub struct FfmpegRenderer {
    ffmpeg: Option<PathBuf>,
    caption_style: CaptionStyle,
    encoding: EncodingConfig,
    probe: Arc<dyn MediaProbe>,
    timeout_secs: Option<u64>,
}

impl FfmpegRenderer {
    /// Look up FFmpeg and ffprobe in PATH.
    pub fn detect(caption_style: CaptionStyle, encoding: EncodingConfig) -> Self {
        let ffmpeg = match (check_ffmpeg(), check_ffprobe()) {
            (Ok(ffmpeg), Ok(_)) => Some(ffmpeg),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Media toolkit unavailable, clips will not be rendered: {}", e);
                None
            }
        };

        Self {
            ffmpeg,
            caption_style,
            encoding,
            probe: Arc::new(FfprobeProbe),
            timeout_secs: None,
        }
    }

    /// Replace the source probe.
    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Kill FFmpeg runs that take longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn is_available(&self) -> bool {
        self.ffmpeg.is_some()
    }

    async fn try_render(&self, ffmpeg: &Path, request: &RenderRequest) -> MediaResult<RenderedClip> {
        let segment = &request.segment;
        let duration = segment.effective_duration(request.requested_duration);
        if duration.is_nan() || duration <= 0.0 {
            return Err(MediaError::internal(format!(
                "Nothing to render: requested {:.2}s from a {:.2}s segment",
                request.requested_duration,
                segment.span()
            )));
        }

        let info = self.probe.probe(&request.source).await?;
        let plan = plan_frame(
            info.width,
            info.height,
            request.target_resolution,
            request.target_aspect,
        );
        debug!(
            video_id = %request.video_id,
            source_width = info.width,
            source_height = info.height,
            plan = ?plan,
            "Planned frame geometry"
        );

        let caption_file = match CaptionFile::create(
            &request.caption,
            &self.caption_style,
            request.target_resolution.width,
        ) {
            Ok(file) => file,
            Err(e) => {
                warn!(video_id = %request.video_id, "Caption unavailable, rendering without it: {}", e);
                None
            }
        };

        if let Some(parent) = request.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // FFmpeg writes to a sibling that only becomes the clip once complete.
        let partial = partial_path(&request.output);
        let encoded = match self
            .encode(ffmpeg, request, &plan, caption_file.as_ref(), &partial, duration)
            .await
        {
            Err(e @ MediaError::FfmpegFailed { .. }) if caption_file.is_some() => {
                warn!(
                    video_id = %request.video_id,
                    clip = request.clip_number,
                    "Captioned render failed, retrying without caption: {}",
                    e.detailed()
                );
                self.encode(ffmpeg, request, &plan, None, &partial, duration).await
            }
            other => other,
        };

        let finished = match encoded {
            Ok(()) if partial.exists() => tokio::fs::rename(&partial, &request.output)
                .await
                .map_err(MediaError::from),
            Ok(()) => Err(MediaError::FileNotFound(partial.clone())),
            Err(e) => Err(e),
        };
        if let Err(e) = finished {
            remove_partial(&partial).await;
            return Err(e);
        }

        Ok(RenderedClip {
            video_id: request.video_id.clone(),
            clip_number: request.clip_number,
            path: request.output.clone(),
            duration,
        })
    }

    async fn encode(
        &self,
        ffmpeg: &Path,
        request: &RenderRequest,
        plan: &FramePlan,
        caption: Option<&CaptionFile>,
        output: &Path,
        duration: f64,
    ) -> MediaResult<()> {
        let graph = build_filter_graph(
            plan,
            request.target_resolution,
            caption.map(|f| (f.path(), &self.caption_style)),
        );

        let cmd = FfmpegCommand::new(&request.source, output)
            .seek(request.segment.start_time)
            .duration(duration)
            .filter_complex(graph)
            .map(VIDEO_OUTPUT_LABEL)
            .map("0:a?")
            .output_args(self.encoding.to_ffmpeg_args());

        let mut runner = FfmpegRunner::new().with_program(ffmpeg);
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        let total_ms = (duration * 1000.0) as i64;
        let video_id = request.video_id.clone();
        runner
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    video_id = %video_id,
                    percent = progress.percentage(total_ms),
                    speed = progress.speed,
                    "Render progress"
                );
            })
            .await
    }
}

/// `<stem>.part.mp4` next to the final clip.
fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    output.with_file_name(format!("{}.part.{}", stem, extension))
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial clip"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove partial clip: {}", e),
    }
}

#[async_trait]
impl ClipRenderer for FfmpegRenderer {
    async fn render(&self, request: &RenderRequest) -> RenderOutcome {
        let Some(ffmpeg) = self.ffmpeg.as_deref() else {
            return RenderOutcome::ToolkitUnavailable {
                source: request.source.clone(),
            };
        };

        info!(
            video_id = %request.video_id,
            clip = request.clip_number,
            start = request.segment.start_time,
            end = request.segment.clip_end(request.requested_duration),
            "Rendering clip"
        );

        match self.try_render(ffmpeg, request).await {
            Ok(clip) => {
                info!(
                    video_id = %clip.video_id,
                    clip = clip.clip_number,
                    duration = clip.duration,
                    output = %clip.path.display(),
                    "Clip rendered"
                );
                RenderOutcome::Rendered(clip)
            }
            Err(e) if e.is_toolkit_missing() => {
                error!(video_id = %request.video_id, "Media toolkit disappeared: {}", e);
                RenderOutcome::ToolkitUnavailable {
                    source: request.source.clone(),
                }
            }
            Err(e) => {
                let reason = e.detailed();
                error!(
                    video_id = %request.video_id,
                    clip = request.clip_number,
                    "Render failed: {}",
                    reason
                );
                RenderOutcome::RenderFailed {
                    source: request.source.clone(),
                    reason,
                }
            }
        }
    }
}
