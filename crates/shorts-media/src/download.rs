//! Video download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use shorts_models::VideoCandidate;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};

/// Default yt-dlp format selector: best MP4 video and audio, merged.
pub const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Minimum size for a valid cookies file (bytes).
/// A real Netscape cookies file is at least ~50 bytes.
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Retrieves the media for a candidate into a local directory.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `candidate` into `dest_dir`, returning the local file path.
    async fn fetch(&self, candidate: &VideoCandidate, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// yt-dlp settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Netscape cookies file passed to yt-dlp when valid
    pub cookies_path: Option<PathBuf>,
    /// yt-dlp `-f` selector
    pub format: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cookies_path: None,
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            cookies_path: std::env::var("YTDLP_COOKIES_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            format: std::env::var("YTDLP_FORMAT").unwrap_or_else(|_| DEFAULT_FORMAT.to_string()),
        }
    }
}

/// [`MediaFetcher`] backed by the `yt-dlp` binary.
#[derive(Debug, Clone, Default)]
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Destination path of a candidate's media: `<dest_dir>/<id>.mp4`.
    pub fn output_path(candidate: &VideoCandidate, dest_dir: &Path) -> PathBuf {
        dest_dir.join(format!("{}.mp4", candidate.id))
    }

    async fn usable_cookies(&self) -> Option<&Path> {
        let path = self.config.cookies_path.as_deref()?;
        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.len() as u64 >= MIN_COOKIES_FILE_SIZE && is_valid_netscape_cookies(&content) => {
                Some(path)
            }
            Ok(_) => {
                warn!(path = %path.display(), "Cookies file is not a valid Netscape cookies file, ignoring");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to read cookies file: {}", e);
                None
            }
        }
    }

    fn build_args(&self, url: &str, output_path: &Path, cookies: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
        ];

        if let Some(cookies) = cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, candidate: &VideoCandidate, dest_dir: &Path) -> MediaResult<PathBuf> {
        let output_path = Self::output_path(candidate, dest_dir);

        if let Ok(metadata) = tokio::fs::metadata(&output_path).await {
            if metadata.len() > 0 {
                info!("Using existing video file: {}", output_path.display());
                return Ok(output_path);
            }
            tokio::fs::remove_file(&output_path).await?;
        }

        let program = check_ytdlp()?;
        tokio::fs::create_dir_all(dest_dir).await?;

        let url = candidate.watch_url();
        info!(video_id = %candidate.id, "Downloading video to {}", output_path.display());

        let cookies = self.usable_cookies().await;
        let args = self.build_args(&url, &output_path, cookies);
        debug!("Running yt-dlp {}", args.join(" "));

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            let error_msg = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Unknown error");

            if stderr.contains("429") || stderr.contains("Too Many Requests") || stderr.contains("Sign in to confirm") {
                warn!(video_id = %candidate.id, "YouTube rate limit detected");
            }

            return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
        }

        if !output_path.exists() {
            return Err(MediaError::download_failed("Output file not created"));
        }

        let file_size = tokio::fs::metadata(&output_path).await?.len();
        info!(
            video_id = %candidate.id,
            output = %output_path.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );

        Ok(output_path)
    }
}

/// Validate that a cookies file appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with domain entries.
fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File") || content.starts_with("# HTTP Cookie File") {
        return true;
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .any(|line| line.split('\t').count() >= 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path() {
        let candidate = VideoCandidate::new("abc123", "t", "c");
        assert_eq!(
            YtDlpFetcher::output_path(&candidate, Path::new("/tmp/work")),
            PathBuf::from("/tmp/work/abc123.mp4")
        );
    }

    #[test]
    fn test_netscape_cookies() {
        assert!(is_valid_netscape_cookies("# Netscape HTTP Cookie File\n"));
        assert!(is_valid_netscape_cookies(
            ".youtube.com\tTRUE\t/\tTRUE\t0\tPREF\tf1=5000"
        ));
        assert!(!is_valid_netscape_cookies("{\"cookies\": []}"));
    }

    #[test]
    fn test_build_args() {
        let fetcher = YtDlpFetcher::default();
        let args = fetcher.build_args(
            "https://www.youtube.com/watch?v=x",
            Path::new("/tmp/x.mp4"),
            Some(Path::new("/tmp/cookies.txt")),
        );
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=x");
        let pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[pos + 1], "/tmp/x.mp4");
        assert!(args.contains(&"--cookies".to_string()));
        assert!(args.contains(&DEFAULT_FORMAT.to_string()));
    }

    #[tokio::test]
    async fn test_existing_file_is_reused() {
        let dir = TempDir::new().unwrap();
        let candidate = VideoCandidate::new("cached", "t", "c");
        let path = YtDlpFetcher::output_path(&candidate, dir.path());
        std::fs::write(&path, b"not really a video").unwrap();

        let fetched = YtDlpFetcher::default().fetch(&candidate, dir.path()).await.unwrap();
        assert_eq!(fetched, path);
    }

    #[tokio::test]
    async fn test_invalid_cookies_are_ignored() {
        let dir = TempDir::new().unwrap();
        let cookies = dir.path().join("cookies.txt");
        std::fs::write(&cookies, "garbage").unwrap();

        let fetcher = YtDlpFetcher::new(FetcherConfig {
            cookies_path: Some(cookies),
            ..Default::default()
        });
        assert!(fetcher.usable_cookies().await.is_none());
    }
}
