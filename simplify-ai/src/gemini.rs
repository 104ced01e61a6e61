//! Gemini `generateContent` backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ModelBackend;
use crate::error::{AiError, AiResult};
use crate::prompt::PromptSpec;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Returned when the upstream answers without any candidate text
pub const EMPTY_RESULT: &str = "No result found.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Production backend talking to the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> AiResult<Self> {
        let base_url: String = base_url.into();
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn api_key(&self) -> AiResult<&str> {
        self.api_key.as_deref().ok_or(AiError::Config("GEMINI_API_KEY"))
    }

    /// Read the body, mapping non-success statuses to [`AiError::Upstream`]
    async fn read_body(response: reqwest::Response) -> AiResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, model: &str, spec: &PromptSpec) -> AiResult<String> {
        let key = self.api_key()?;
        let url = format!("{}/v1/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest {
            contents: [Content {
                parts: [Part {
                    text: &spec.prompt_text,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: spec.max_output_tokens,
                temperature: spec.temperature,
            },
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = Self::read_body(response).await.inspect_err(|e| {
            tracing::warn!(model = %model, error = %e, "Gemini request failed");
        })?;
        tracing::debug!(model = %model, status = status.as_u16(), "Gemini response received");

        let parsed: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "Gemini response is not JSON");
                return Err(AiError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
        };
        Ok(parsed.first_text().unwrap_or_else(|| EMPTY_RESULT.to_string()))
    }

    async fn list_models(&self) -> AiResult<Value> {
        let key = self.api_key()?;
        let url = format!("{}/v1/models", self.base_url);
        let response = self.http.get(&url).header(API_KEY_HEADER, key).send().await?;
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|_| AiError::Upstream {
            status: 502,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: [Content { parts: [Part { text: "hi" }] }],
            generation_config: GenerationConfig {
                max_output_tokens: 256,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "generationConfig": { "maxOutputTokens": 256, "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }, { "text": "second" }] } },
                { "content": { "parts": [{ "text": "other" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("first"));

        let empty: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [{}] })).unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let backend = GeminiBackend::new(DEFAULT_API_BASE, Some("  ".into())).unwrap();
        assert!(!backend.is_configured());
        assert!(GeminiBackend::new(DEFAULT_API_BASE, Some("k".into())).unwrap().is_configured());
    }
}
