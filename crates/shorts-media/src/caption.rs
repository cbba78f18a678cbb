//! Caption text preparation for the drawtext overlay.

use std::io::Write;
use std::path::Path;

use shorts_models::CaptionStyle;
use tempfile::NamedTempFile;

use crate::error::MediaResult;

/// Average glyph advance as a share of the font size.
const AVERAGE_GLYPH_WIDTH: f64 = 0.55;

/// Characters that fit on one caption line for a frame of `frame_width` pixels.
pub fn max_chars_per_line(style: &CaptionStyle, frame_width: u32) -> usize {
    let usable = f64::from(frame_width) * style.width_ratio;
    let glyph = f64::from(style.font_size.max(1)) * AVERAGE_GLYPH_WIDTH;
    ((usable / glyph).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are kept whole.
pub fn wrap_caption(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Wrapped caption written to a temporary file for `drawtext=textfile=`.
///
/// Reading the text from a file sidesteps filtergraph escaping of user text.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct CaptionFile {
    file: NamedTempFile,
}

impl CaptionFile {
    /// Wrap `text` for the frame width and write it out. Returns `None` for blank captions.
    pub fn create(text: &str, style: &CaptionStyle, frame_width: u32) -> MediaResult<Option<Self>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let wrapped = wrap_caption(text, max_chars_per_line(style, frame_width));

        let mut file = tempfile::Builder::new()
            .prefix("caption-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(wrapped.as_bytes())?;
        file.flush()?;

        Ok(Some(Self { file }))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_caption() {
        assert_eq!(wrap_caption("one two three four", 9), "one two\nthree\nfour");
        assert_eq!(wrap_caption("  spaced   out  ", 40), "spaced out");
        assert_eq!(wrap_caption("", 10), "");
    }

    #[test]
    fn test_long_word_is_not_split() {
        assert_eq!(wrap_caption("a supercalifragilistic b", 5), "a\nsupercalifragilistic\nb");
    }

    #[test]
    fn test_max_chars_per_line() {
        let style = CaptionStyle::default();
        // 1080 * 0.9 / (30 * 0.55) = 58.9
        assert_eq!(max_chars_per_line(&style, 1080), 58);

        let tiny = CaptionStyle::default().with_font_size(5000);
        assert_eq!(max_chars_per_line(&tiny, 1080), 1);
    }

    #[test]
    fn test_caption_file() {
        let style = CaptionStyle::default();
        assert!(CaptionFile::create("   ", &style, 1080).unwrap().is_none());

        let file = CaptionFile::create("Check out this highlight!", &style, 1080)
            .unwrap()
            .unwrap();
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "Check out this highlight!");

        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
    }
}
