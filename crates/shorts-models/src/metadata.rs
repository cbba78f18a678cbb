//! Descriptive metadata persisted beside each clip.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Advisory title length for generated metadata.
pub const TITLE_TARGET_CHARS: usize = 60;
/// Advisory description length for generated metadata.
pub const DESCRIPTION_TARGET_CHARS: usize = 300;
/// Advisory tag count for generated metadata.
pub const MAX_TAGS: usize = 10;

/// Title, description and tags for one rendered clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail_description: String,
}

impl ClipMetadata {
    /// Whether any field is over its advisory target. Targets are never enforced.
    pub fn exceeds_targets(&self) -> bool {
        self.title.chars().count() > TITLE_TARGET_CHARS
            || self.description.chars().count() > DESCRIPTION_TARGET_CHARS
            || self.tags.len() > MAX_TAGS
    }

    /// Pretty JSON as written to `<stem>_metadata.json`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClipMetadata {
        ClipMetadata {
            title: "Short title".to_string(),
            description: "Desc".to_string(),
            tags: vec!["a".to_string()],
            thumbnail_description: "thumb".to_string(),
        }
    }

    #[test]
    fn test_targets_are_advisory() {
        let mut metadata = sample();
        assert!(!metadata.exceeds_targets());

        metadata.title = "x".repeat(61);
        assert!(metadata.exceeds_targets());
        // Still serializes untouched.
        assert!(metadata.to_json_pretty().unwrap().contains(&"x".repeat(61)));
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Short title");
        assert_eq!(value["tags"][0], "a");
        assert_eq!(value["thumbnail_description"], "thumb");
    }
}
