//! Caption overlay style.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vertical anchor of the caption; always horizontally centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    #[default]
    Bottom,
}

impl CaptionPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionPosition::Top => "top",
            CaptionPosition::Bottom => "bottom",
        }
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptionPosition {
    type Err = CaptionPositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(CaptionPosition::Top),
            "bottom" => Ok(CaptionPosition::Bottom),
            _ => Err(CaptionPositionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown caption position: {0}")]
pub struct CaptionPositionParseError(String);

/// Text style for burned-in captions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionStyle {
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default)]
    pub position: CaptionPosition,
    /// Share of the frame width available to a caption line
    #[serde(default = "default_width_ratio")]
    pub width_ratio: f64,
}

fn default_font() -> String {
    "Arial".to_string()
}
fn default_font_size() -> u32 {
    30
}
fn default_color() -> String {
    "white".to_string()
}
fn default_stroke_color() -> String {
    "black".to_string()
}
fn default_stroke_width() -> u32 {
    2
}
fn default_width_ratio() -> f64 {
    0.9
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_size: default_font_size(),
            color: default_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            position: CaptionPosition::default(),
            width_ratio: default_width_ratio(),
        }
    }
}

impl CaptionStyle {
    pub fn with_position(mut self, position: CaptionPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = CaptionStyle::default();
        assert_eq!(style.font, "Arial");
        assert_eq!(style.font_size, 30);
        assert_eq!(style.color, "white");
        assert_eq!(style.stroke_color, "black");
        assert_eq!(style.stroke_width, 2);
        assert_eq!(style.position, CaptionPosition::Bottom);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let style: CaptionStyle = serde_json::from_str(r#"{"position":"top"}"#).unwrap();
        assert_eq!(style.position, CaptionPosition::Top);
        assert_eq!(style.font_size, 30);
    }
}
