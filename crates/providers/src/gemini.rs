//! Gemini provider implementation.
//!
//! Talks to the Generative Language REST API directly:
//! - `x-goog-api-key` header authentication
//! - `models/` name normalization on the request path
//! - Reply extraction joins all candidate parts, because `candidates[0]`
//!   alone drops text when the API splits a reply across parts

use async_trait::async_trait;
use quizforge_core::error::ProviderError;
use quizforge_core::provider::Provider;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: normalize_model(&model.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reuse an existing HTTP client (shared across providers in a pool).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}:generateContent",
            self.base_url, API_VERSION, self.model
        )
    }
}

/// Prefix bare model names with `models/`, leaving full paths untouched.
fn normalize_model(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("invalid response body: {e}")))?;

        let text = extract_text(&parsed);
        trace!(reply_chars = text.len(), "Gemini reply");

        if text.is_empty() {
            return Err(ProviderError::EmptyReply);
        }
        Ok(text)
    }
}

/// Join the text of every part of every candidate, in order.
fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_is_normalized() {
        assert_eq!(normalize_model("gemini-2.0-flash"), "models/gemini-2.0-flash");
        assert_eq!(
            normalize_model("models/gemini-2.0-flash"),
            "models/gemini-2.0-flash"
        );
        assert_eq!(normalize_model("  gemini-2.0-flash "), "models/gemini-2.0-flash");
    }

    #[test]
    fn endpoint_includes_model_path() {
        let provider = GeminiProvider::new("key", "gemini-2.0-flash")
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn extract_text_joins_all_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "FUNCTION_CALL: "}, {"text": "a|1"}]}},
                {"content": {"parts": [{"text": ""}]}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(&response), "FUNCTION_CALL: a|1");
    }

    #[test]
    fn extract_text_tolerates_missing_fields() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extract_text(&response), "");

        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {}}, {}]
        }))
        .unwrap();
        assert_eq!(extract_text(&response), "");
    }
}
