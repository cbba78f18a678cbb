//! Output layout and temp-media housekeeping.

use std::path::{Path, PathBuf};

use shorts_models::{clip_file_name, metadata_file_name, ClipMetadata};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::PipelineResult;

/// Where clips and their metadata land.
///
/// Both files of a pair share the stem `<video_id>_clip_<n>`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn clip_path(&self, video_id: &str, clip_number: u32) -> PathBuf {
        self.output_dir.join(clip_file_name(video_id, clip_number))
    }

    pub fn metadata_path(&self, video_id: &str, clip_number: u32) -> PathBuf {
        self.output_dir.join(metadata_file_name(video_id, clip_number))
    }
}

/// Write metadata as pretty JSON.
///
/// Goes through a `.tmp` sibling and a rename so a crash never leaves a
/// truncated file next to the clip.
pub async fn write_metadata(path: &Path, metadata: &ClipMetadata) -> PipelineResult<()> {
    let json = metadata.to_json_pretty()?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), "Wrote clip metadata");
    Ok(())
}

/// Delete every file directly inside `dir`.
///
/// Best effort: failures are logged and skipped. Returns how many files were removed.
pub async fn clean_temp_dir(dir: &Path) -> usize {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), "Cannot read temp directory: {}", e);
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), "Failed to list temp directory: {}", e);
                break;
            }
        };

        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), "Failed to delete temp file: {}", e),
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_shares_stem() {
        let layout = OutputLayout::new("/out");
        assert_eq!(layout.clip_path("abc", 2), PathBuf::from("/out/abc_clip_2.mp4"));
        assert_eq!(
            layout.metadata_path("abc", 2),
            PathBuf::from("/out/abc_clip_2_metadata.json")
        );
    }

    #[tokio::test]
    async fn test_write_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc_clip_1_metadata.json");
        let metadata = ClipMetadata {
            title: "T".to_string(),
            description: "D".to_string(),
            tags: vec!["a".to_string()],
            thumbnail_description: "th".to_string(),
        };

        write_metadata(&path, &metadata).await.unwrap();

        let written: ClipMetadata =
            serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(written, metadata);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_clean_temp_dir_removes_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").await.unwrap();
        fs::write(dir.path().join("b.part"), b"y").await.unwrap();
        fs::create_dir(dir.path().join("nested")).await.unwrap();

        assert_eq!(clean_temp_dir(dir.path()).await, 2);
        assert!(dir.path().join("nested").exists());
        assert!(!dir.path().join("a.mp4").exists());
    }

    #[tokio::test]
    async fn test_clean_missing_dir_is_harmless() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_temp_dir(&dir.path().join("missing")).await, 0);
    }
}
