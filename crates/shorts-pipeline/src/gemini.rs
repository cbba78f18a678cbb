//! Gemini client used by the segment and metadata generators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shorts_models::ApiKey;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models tried in order until one answers.
pub const DEFAULT_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

/// A generative model that answers prompts with JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> PipelineResult<serde_json::Value>;
}

/// Gemini configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub models: Vec<String>,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let models: Vec<String> = std::env::var("GEMINI_MODELS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            base_url: std::env::var("GEMINI_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            models: if models.is_empty() {
                DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
            } else {
                models
            },
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// Gemini API client.
pub struct GeminiClient {
    api_key: ApiKey,
    client: Client,
    config: GeminiConfig,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(api_key: ApiKey, config: GeminiConfig) -> PipelineResult<Self> {
        if config.models.is_empty() {
            return Err(PipelineError::config_error("No Gemini models configured"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::config_error(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            config,
        })
    }

    /// Call one model.
    async fn call_gemini_api(&self, model: &str, prompt: &str) -> PipelineResult<serde_json::Value> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::ai_failed(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::ai_failed(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            PipelineError::ai_failed(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| PipelineError::invalid_ai_response("No content in Gemini response"))?;

        debug!(model = %model, chars = text.len(), "Gemini answered");
        parse_json_text(text)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> PipelineResult<serde_json::Value> {
        let mut last_error = None;

        for model in &self.config.models {
            debug!("Attempting Gemini API with model: {}", model);
            match self.call_gemini_api(model, prompt).await {
                Ok(value) => {
                    info!("Got response from {}", model);
                    return Ok(value);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PipelineError::ai_failed("All Gemini models failed")))
    }
}

/// Parse model output as JSON, tolerating a Markdown code fence around it.
pub fn parse_json_text(text: &str) -> PipelineResult<serde_json::Value> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    serde_json::from_str(text.trim())
        .map_err(|e| PipelineError::invalid_ai_response(format!("Failed to parse JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_response(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn client(server: &MockServer, models: &[&str]) -> GeminiClient {
        let config = GeminiConfig {
            base_url: server.uri(),
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        };
        GeminiClient::new(ApiKey::new("gem-key"), config).unwrap()
    }

    #[test]
    fn test_parse_json_text_strips_fences() {
        let value = parse_json_text("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);

        let value = parse_json_text("  [1, 2]  ").unwrap();
        assert_eq!(value[1], 2);

        assert!(parse_json_text("not json").is_err());
    }

    #[test]
    fn test_rejects_empty_model_list() {
        let config = GeminiConfig {
            models: Vec::new(),
            ..Default::default()
        };
        assert!(GeminiClient::new(ApiKey::new("k"), config).is_err());
    }

    #[tokio::test]
    async fn test_generate_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "gem-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response(r#"{"segments": []}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server, &["gemini-test"])
            .generate_json("prompt")
            .await
            .unwrap();
        assert_eq!(value, json!({"segments": []}));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/broken:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/working:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("```json\n[1]\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server, &["broken", "working"])
            .generate_json("prompt")
            .await
            .unwrap();
        assert_eq!(value, json!([1]));
    }

    #[tokio::test]
    async fn test_all_models_failing_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, &["a", "b"]).generate_json("prompt").await.unwrap_err();
        assert!(matches!(err, PipelineError::AiFailed(_)));
    }
}
