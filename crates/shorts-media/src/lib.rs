#![deny(unreachable_patterns)]
//! FFmpeg, ffprobe and yt-dlp wrappers.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and running
//! - Progress parsing from `-progress pipe:2`
//! - Source probing and downloading
//! - Frame geometry and filter graphs for vertical clips
//! - The clip renderer with its tagged outcome

pub mod caption;
pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod probe;
pub mod progress;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use download::{FetcherConfig, MediaFetcher, YtDlpFetcher};
pub use error::{MediaError, MediaResult};
pub use geometry::{plan_frame, FramePlan};
pub use probe::{probe_video, FfprobeProbe, MediaProbe, VideoInfo};
pub use progress::FfmpegProgress;
pub use render::{ClipRenderer, FfmpegRenderer, RenderOutcome, RenderRequest};
