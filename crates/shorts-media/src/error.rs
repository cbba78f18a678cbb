//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing, fetching or rendering media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an invalid video error.
    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error means a required binary is missing.
    pub fn is_toolkit_missing(&self) -> bool {
        matches!(self, MediaError::FfmpegNotFound | MediaError::FfprobeNotFound)
    }

    /// Error text including the tail of stderr when present.
    pub fn detailed(&self) -> String {
        match self {
            MediaError::FfmpegFailed {
                stderr: Some(stderr),
                ..
            }
            | MediaError::FfprobeFailed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => format!("{}: {}", self, stderr.trim()),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_includes_stderr() {
        let err = MediaError::ffmpeg_failed("exit 1", Some("Invalid argument\n".to_string()), Some(1));
        assert_eq!(err.detailed(), "FFmpeg command failed: exit 1: Invalid argument");

        let err = MediaError::ffmpeg_failed("exit 1", None, Some(1));
        assert_eq!(err.detailed(), "FFmpeg command failed: exit 1");
    }

    #[test]
    fn test_toolkit_missing() {
        assert!(MediaError::FfmpegNotFound.is_toolkit_missing());
        assert!(MediaError::FfprobeNotFound.is_toolkit_missing());
        assert!(!MediaError::YtDlpNotFound.is_toolkit_missing());
    }
}
