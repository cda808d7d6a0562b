//! Gemini API client for match predictions
//!
//! Sends a single text prompt to the `generateContent` endpoint and returns the
//! concatenated text parts of the first candidate.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::model::TextModel;
use crate::config::AiConfig;
use crate::error::{PollaError, Result};

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: Option<u64>,
    pub temperature: f32,
}

impl GeminiConfig {
    /// Build from the `[ai]` section; `None` when no API key is available.
    pub fn from_ai_config(config: &AiConfig) -> Option<Self> {
        let api_key = config.resolved_api_key()?;
        Some(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini API client
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| PollaError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, "Sending request to Gemini API");

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API error: {} - {}", status, body);
            return Err(PollaError::AiRequest(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PollaError::AiRequest(format!("Failed to parse Gemini response: {}", e)))?;

        let text = extract_text(&parsed);
        if text.trim().is_empty() {
            return Err(PollaError::AiRequest(
                "Gemini returned no text candidates".to_string(),
            ));
        }

        debug!("Gemini response received: {} chars", text.len());
        Ok(text)
    }
}

fn extract_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_key() {
        let mut ai = AiConfig::default();
        ai.api_key = Some("   ".to_string());
        assert!(GeminiConfig::from_ai_config(&ai).is_none());

        ai.api_key = Some("secret".to_string());
        ai.base_url = "https://example.test/v1beta/".to_string();
        let config = GeminiConfig::from_ai_config(&ai).unwrap();
        assert_eq!(config.base_url, "https://example.test/v1beta");
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: "k".to_string(),
            base_url: "https://example.test/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: None,
            temperature: 0.7,
        })
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"predictedScore\":"},{"text":"\"1-0\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&response), r#"{"predictedScore":"1-0"}"#);

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(extract_text(&empty), "");
    }
}
