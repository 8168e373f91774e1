//! Instant-answer web search.
//!
//! Queries a JSON search endpoint and reads one short answer field from the
//! response, which is added to the prompt as reference material.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tomodachi_core::config::{SearchMethod, SearchSettings};
use tomodachi_core::search::{SearchClient, SearchError};

/// Search client for instant-answer style APIs.
#[derive(Clone)]
pub struct WebSearchAgent {
    client: Client,
    endpoint: String,
    method: SearchMethod,
    answer_field: String,
    api_key: Option<String>,
}

impl WebSearchAgent {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.endpoint.clone(),
            method: settings.method,
            answer_field: settings.answer_field.clone(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    async fn perform_search(&self, query: &str) -> Result<String, SearchError> {
        let request = match self.method {
            SearchMethod::Get => {
                let mut params = vec![("q", query), ("format", "json"), ("no_html", "1")];
                if let Some(key) = &self.api_key {
                    params.push(("key", key.as_str()));
                }
                self.client.get(&self.endpoint).query(&params)
            }
            SearchMethod::Post => self.client.post(&self.endpoint).json(&SearchRequest {
                query,
                key: self.api_key.as_deref(),
            }),
        };

        let response = request
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read search error body".to_string());
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| SearchError::Parse(err.without_url().to_string()))?;

        Ok(extract_answer(&payload, &self.answer_field))
    }
}

#[async_trait]
impl SearchClient for WebSearchAgent {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let answer = self.perform_search(trimmed).await?;
        tracing::debug!(chars = answer.chars().count(), "Search answer received");
        Ok(answer)
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

/// Reads `field` as a trimmed string; anything else is an empty answer.
fn extract_answer(root: &Value, field: &str) -> String {
    root.get(field)
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
