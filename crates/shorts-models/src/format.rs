//! Output platform presets, resolutions and aspect ratios.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width-to-height ratio of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Standard portrait (9:16) used by every short-form platform.
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Landscape (16:9).
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Exact ratio comparison via cross multiplication.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        u64::from(self.width) * u64::from(height) == u64::from(self.height) * u64::from(width)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width = w
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(w.to_string()))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(h.to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 1080x1920 portrait frame.
    pub const PORTRAIT_1080: Resolution = Resolution {
        width: 1080,
        height: 1920,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target platform for produced clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    YoutubeShorts,
    Tiktok,
    InstagramReels,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::YoutubeShorts,
        OutputFormat::Tiktok,
        OutputFormat::InstagramReels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::YoutubeShorts => "youtube_shorts",
            OutputFormat::Tiktok => "tiktok",
            OutputFormat::InstagramReels => "instagram_reels",
        }
    }

    /// Platform name for prompts, e.g. "Youtube Shorts".
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Longest clip the platform accepts, in seconds.
    pub fn max_duration(&self) -> f64 {
        match self {
            OutputFormat::YoutubeShorts | OutputFormat::Tiktok => 60.0,
            OutputFormat::InstagramReels => 90.0,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::PORTRAIT_1080
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        AspectRatio::PORTRAIT
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube_shorts" => Ok(OutputFormat::YoutubeShorts),
            "tiktok" => Ok(OutputFormat::Tiktok),
            "instagram_reels" => Ok(OutputFormat::InstagramReels),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown output format: {0}")]
pub struct OutputFormatParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(OutputFormat::YoutubeShorts.max_duration(), 60.0);
        assert_eq!(OutputFormat::Tiktok.max_duration(), 60.0);
        assert_eq!(OutputFormat::InstagramReels.max_duration(), 90.0);

        for format in OutputFormat::ALL {
            assert_eq!(format.resolution(), Resolution::new(1080, 1920));
            assert_eq!(format.aspect_ratio(), AspectRatio::PORTRAIT);
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(
            "instagram_reels".parse::<OutputFormat>().unwrap(),
            OutputFormat::InstagramReels
        );
        assert_eq!("TikTok".parse::<OutputFormat>().unwrap(), OutputFormat::Tiktok);
        assert!("vine".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(OutputFormat::YoutubeShorts.display_name(), "Youtube Shorts");
        assert_eq!(OutputFormat::Tiktok.display_name(), "Tiktok");
    }

    #[test]
    fn test_aspect_ratio_matches() {
        assert!(AspectRatio::PORTRAIT.matches(1080, 1920));
        assert!(AspectRatio::PORTRAIT.matches(720, 1280));
        assert!(!AspectRatio::PORTRAIT.matches(1280, 720));
        assert!(AspectRatio::LANDSCAPE.matches(1280, 720));
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT);
        assert!("9x16".parse::<AspectRatio>().is_err());
        assert!("0:16".parse::<AspectRatio>().is_err());
    }
}
