//! Title, description and tags for rendered clips.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shorts_models::{ClipMetadata, OutputFormat, Segment, VideoCandidate};
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::gemini::GenerativeClient;

/// Thumbnail text used by the template.
pub const DEFAULT_THUMBNAIL_DESCRIPTION: &str =
    "Thumbnail showing the most exciting moment from the clip.";

/// What a metadata source knows about one clip.
#[derive(Debug, Clone, Copy)]
pub struct MetadataContext<'a> {
    pub candidate: &'a VideoCandidate,
    pub segment: &'a Segment,
    /// Caption actually burned into the clip
    pub caption: &'a str,
    /// Rendered clip length in seconds
    pub duration: f64,
    pub format: OutputFormat,
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn metadata(&self, ctx: &MetadataContext<'_>) -> PipelineResult<ClipMetadata>;
}

/// Fixed template keyed on the source title, channel and output format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMetadataSource;

impl TemplateMetadataSource {
    pub fn build(ctx: &MetadataContext<'_>) -> ClipMetadata {
        ClipMetadata {
            title: format!("{} - Highlight", ctx.candidate.title),
            description: format!("Check out this highlight from {}!", ctx.candidate.channel),
            tags: vec![
                ctx.format.as_str().to_string(),
                "highlight".to_string(),
                "trending".to_string(),
                "viral".to_string(),
            ],
            thumbnail_description: DEFAULT_THUMBNAIL_DESCRIPTION.to_string(),
        }
    }
}

#[async_trait]
impl MetadataSource for TemplateMetadataSource {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn metadata(&self, ctx: &MetadataContext<'_>) -> PipelineResult<ClipMetadata> {
        Ok(Self::build(ctx))
    }
}

/// Metadata written by a generative model.
///
/// Fields the model leaves out are taken from the template.
pub struct GenerativeMetadataSource {
    client: Arc<dyn GenerativeClient>,
}

impl GenerativeMetadataSource {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    fn build_prompt(ctx: &MetadataContext<'_>) -> String {
        format!(
            r#"Write metadata for a short vertical clip cut from an online video.

Platform: {platform}
Original video title: {title}
Channel: {channel}
Original description:
{description}
Clip caption: {caption}
Clip range: {start:.0}s to {end:.0}s of the original
Clip duration: {duration:.0} seconds

Return ONLY a JSON object with these fields:
{{
  "title": "catchy title, at most 60 characters",
  "description": "engaging description, at most 300 characters",
  "tags": ["up to 10 relevant tags"],
  "thumbnail_description": "what the thumbnail should show"
}}
"#,
            platform = ctx.format.display_name(),
            title = ctx.candidate.title,
            channel = ctx.candidate.channel,
            description = ctx.candidate.description,
            caption = ctx.caption,
            start = ctx.segment.start_time,
            end = ctx.segment.start_time + ctx.duration,
            duration = ctx.duration,
        )
    }

    fn parse_metadata(value: &Value, ctx: &MetadataContext<'_>) -> PipelineResult<ClipMetadata> {
        let Value::Object(map) = value else {
            return Err(PipelineError::invalid_ai_response("Expected a JSON object"));
        };

        let mut metadata = TemplateMetadataSource::build(ctx);
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(title) = text("title") {
            metadata.title = title;
        }
        if let Some(description) = text("description") {
            metadata.description = description;
        }
        if let Some(thumbnail) = text("thumbnail_description") {
            metadata.thumbnail_description = thumbnail;
        }
        if let Some(Value::Array(tags)) = map.get("tags") {
            let tags: Vec<String> = tags
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if !tags.is_empty() {
                metadata.tags = tags;
            }
        }

        if metadata.exceeds_targets() {
            debug!(video_id = %ctx.candidate.id, "Generated metadata is over the advisory length targets");
        }

        Ok(metadata)
    }
}

#[async_trait]
impl MetadataSource for GenerativeMetadataSource {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn metadata(&self, ctx: &MetadataContext<'_>) -> PipelineResult<ClipMetadata> {
        let value = self.client.generate_json(&Self::build_prompt(ctx)).await?;
        Self::parse_metadata(&value, ctx)
    }
}

/// Delegate-or-template metadata generation. Never fails.
pub struct MetadataGenerator {
    primary: Option<Arc<dyn MetadataSource>>,
    fallback: Arc<dyn MetadataSource>,
}

impl MetadataGenerator {
    pub fn new(primary: Option<Arc<dyn MetadataSource>>, fallback: Arc<dyn MetadataSource>) -> Self {
        Self { primary, fallback }
    }

    /// Template-only generator.
    pub fn template() -> Self {
        Self::new(None, Arc::new(TemplateMetadataSource))
    }

    pub async fn generate(&self, ctx: &MetadataContext<'_>) -> ClipMetadata {
        if let Some(primary) = &self.primary {
            match primary.metadata(ctx).await {
                Ok(metadata) => return metadata,
                Err(e) => {
                    warn!(
                        video_id = %ctx.candidate.id,
                        source = primary.name(),
                        "Metadata source failed, using fallback: {}", e
                    );
                }
            }
        }

        match self.fallback.metadata(ctx).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(
                    video_id = %ctx.candidate.id,
                    source = self.fallback.name(),
                    "Fallback metadata source failed, using template: {}", e
                );
                TemplateMetadataSource::build(ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::MockGenerativeClient;
    use serde_json::json;

    fn candidate() -> VideoCandidate {
        VideoCandidate::new("abc", "X", "Y").with_description("desc")
    }

    fn segment() -> Segment {
        Segment::new(10.0, 40.0, 0.9, "Wow").unwrap()
    }

    fn generator_with(response: PipelineResult<Value>) -> MetadataGenerator {
        let mut client = MockGenerativeClient::new();
        let mut response = Some(response);
        client
            .expect_generate_json()
            .times(1)
            .returning(move |_| response.take().unwrap_or_else(|| Ok(json!({}))));
        MetadataGenerator::new(
            Some(Arc::new(GenerativeMetadataSource::new(Arc::new(client)))),
            Arc::new(TemplateMetadataSource),
        )
    }

    #[tokio::test]
    async fn test_template_metadata() {
        let candidate = candidate();
        let segment = segment();
        let ctx = MetadataContext {
            candidate: &candidate,
            segment: &segment,
            caption: "Wow",
            duration: 30.0,
            format: OutputFormat::Tiktok,
        };

        let metadata = MetadataGenerator::template().generate(&ctx).await;
        assert_eq!(metadata.title, "X - Highlight");
        assert!(metadata.description.contains("Y"));
        assert_eq!(metadata.tags, vec!["tiktok", "highlight", "trending", "viral"]);
        assert_eq!(metadata.thumbnail_description, DEFAULT_THUMBNAIL_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_generative_metadata_fills_missing_fields() {
        let candidate = candidate();
        let segment = segment();
        let ctx = MetadataContext {
            candidate: &candidate,
            segment: &segment,
            caption: "Wow",
            duration: 30.0,
            format: OutputFormat::YoutubeShorts,
        };

        let metadata = generator_with(Ok(json!({
            "title": "Unbelievable moment",
            "tags": ["fun", "", 3, "clip"]
        })))
        .generate(&ctx)
        .await;

        assert_eq!(metadata.title, "Unbelievable moment");
        assert_eq!(metadata.tags, vec!["fun", "clip"]);
        assert_eq!(metadata.description, "Check out this highlight from Y!");
    }

    #[tokio::test]
    async fn test_generative_failure_uses_template() {
        let candidate = candidate();
        let segment = segment();
        let ctx = MetadataContext {
            candidate: &candidate,
            segment: &segment,
            caption: "Wow",
            duration: 30.0,
            format: OutputFormat::YoutubeShorts,
        };

        let metadata = generator_with(Err(PipelineError::ai_failed("down"))).generate(&ctx).await;
        assert_eq!(metadata.title, "X - Highlight");

        let metadata = generator_with(Ok(json!(["not", "an", "object"]))).generate(&ctx).await;
        assert_eq!(metadata.title, "X - Highlight");
    }

    #[test]
    fn test_prompt_mentions_platform_and_caption() {
        let candidate = candidate();
        let segment = segment();
        let ctx = MetadataContext {
            candidate: &candidate,
            segment: &segment,
            caption: "Wow",
            duration: 30.0,
            format: OutputFormat::YoutubeShorts,
        };

        let prompt = GenerativeMetadataSource::build_prompt(&ctx);
        assert!(prompt.contains("Youtube Shorts"));
        assert!(prompt.contains("Clip caption: Wow"));
        assert!(prompt.contains("30 seconds"));
    }
}
