//! LLM Client - HTTP client for the model server's OpenAI-compatible API
//!
//! Uses reqwest to call `/v1/models` and `/v1/chat/completions` on an
//! Ollama-style server. Every call carries its own timeout; the caller
//! decides how long each kind of request may take.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::models::*;

/// LLM HTTP Client
#[derive(Clone)]
pub struct LLMClient {
    http_client: Client,
}

impl LLMClient {
    pub fn new() -> Result<Self, LLMError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LLMError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// GET /v1/models and succeed only on a 2xx status
    pub async fn probe(&self, base_url: &str, timeout: Duration) -> Result<(), LLMError> {
        let url = format!("{}/v1/models", base_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LLMError::Status { status: status.as_u16(), body: String::new() });
        }

        Ok(())
    }

    /// Fetch the model catalog, returning identifiers sorted ascending
    pub async fn fetch_models(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, LLMError> {
        let url = format!("{}/v1/models", base_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Status { status: status.as_u16(), body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        parse_model_catalog(&body)
    }

    /// Call chat completion API with a single user message
    pub async fn chat_completion(
        &self,
        base_url: &str,
        model: &str,
        content: String,
        options: &GenerationOptions,
        timeout: Duration,
    ) -> Result<String, LLMError> {
        let chat_request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage { role: "user", content }],
            stream: false,
            options,
        };

        let url = format!("{}/v1/chat/completions", base_url);

        tracing::debug!("Calling LLM API: {} with model {}", url, model);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LLMError::Status { status: status.as_u16(), body: error_text });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let chat_response: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LLMError::ParseError(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or(LLMError::EmptyResponse)
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> LLMError {
    if e.is_timeout() {
        LLMError::Timeout(timeout.as_secs())
    } else {
        LLMError::Connection(e.to_string())
    }
}

/// Extract `data[].id` from a catalog body. Entries without a usable id are
/// skipped; a body without a `data` array yields an empty catalog.
pub(crate) fn parse_model_catalog(body: &str) -> Result<Vec<String>, LLMError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LLMError::ParseError(e.to_string()))?;

    let mut models: Vec<String> = value
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    models.sort();
    Ok(models)
}

// ============================================================================
// OpenAI-compatible API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
