//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Sends a single-part text prompt to `generateContent` and returns the text
//! of the first candidate. Configuration is loaded from secret.json.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tomodachi_core::completion::{CompletionClient, CompletionError, remove_json_artifacts};
use tomodachi_core::secret::SecretService;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Completion client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads the API key from the secret service.
    ///
    /// The model comes from secret.json when set there, then `fallback_model`.
    pub async fn from_secrets(
        service: &dyn SecretService,
        fallback_model: &str,
    ) -> anyhow::Result<Self> {
        let secret_config = service
            .load_secrets()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load secret.json: {}", e))?;

        let gemini_config = secret_config
            .gemini
            .ok_or_else(|| anyhow::anyhow!("Gemini configuration not found in secret.json"))?;

        let model = gemini_config
            .model_name
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback_model.to_string());

        Ok(Self::new(gemini_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint root, e.g. to point at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, CompletionError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        tracing::debug!(model = %self.model, "Sending generateContent request");

        // The request URL carries the API key; keep it out of error text.
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| CompletionError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|err| CompletionError::Transport(err.without_url().to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gemini API returned an error status");
            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: Value = serde_json::from_str(&body_text)
            .map_err(|err| CompletionError::Parse(err.to_string()))?;

        extract_text_response(&parsed).map(|text| remove_json_artifacts(&text))
    }
}

#[async_trait]
impl CompletionClient for GeminiApiAgent {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Reads `candidates[0].content.parts[*].text`, joined with spaces.
///
/// A `content` that is not an object is used in its string form.
fn extract_text_response(root: &Value) -> Result<String, CompletionError> {
    let candidate = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .ok_or(CompletionError::NoCandidates)?;

    let text = match candidate.get("content") {
        Some(Value::Object(content)) => content
            .get("parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .map(|part| part.get("text").and_then(Value::as_str).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(CompletionError::EmptyContent);
    }
    Ok(text.to_string())
}
