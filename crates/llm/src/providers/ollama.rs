//! Ollama completion backend (`POST /api/generate`, non-streaming).
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchboard_core::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// `"json"` constrains the reply to a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    model: String,
    response: String,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Client for a local or remote Ollama server.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Client for `http://localhost:11434`.
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Bound every request by `secs` seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }

    fn generate_request(&self, request: &LlmRequest) -> GenerateRequest {
        let options = OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        };

        GenerateRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            format: request.json_output.then_some("json"),
            options: (options != OllamaOptions::default()).then_some(options),
            stream: false,
        }
    }

    fn into_response(reply: GenerateReply) -> LlmResponse {
        if !reply.done {
            tracing::warn!(model = %reply.model, "Ollama reply marked incomplete");
        }

        let usage = match (reply.prompt_eval_count, reply.eval_count) {
            (None, None) => None,
            (prompt, completion) => Some(LlmUsage::new(
                prompt.unwrap_or(0),
                completion.unwrap_or(0),
            )),
        };

        LlmResponse {
            content: reply.response,
            model: reply.model,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to Ollama");

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.generate_request(request))
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("Ollama unreachable at {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Completion(format!(
                "Ollama returned {}: {}",
                status,
                body.trim()
            )));
        }

        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Undecodable Ollama reply: {}", e)))?;

        tracing::debug!(
            model = %reply.model,
            chars = reply.response.len(),
            "Ollama completion received"
        );

        Ok(Self::into_response(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_base_url() {
        let client = OllamaClient::default();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(OllamaClient::with_base_url("http://gpu:11434/").base_url, "http://gpu:11434");
    }

    #[test]
    fn test_generate_request_carries_sampling_and_format() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("Route this", "llama3.2")
            .with_temperature(0.7)
            .with_max_tokens(100)
            .with_json_output();

        let body = client.generate_request(&request);
        assert_eq!(body.model, "llama3.2");
        assert_eq!(body.prompt, "Route this");
        assert_eq!(body.format, Some("json"));
        assert!(!body.stream);

        let options = body.options.unwrap();
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.num_predict, Some(100));
    }

    #[test]
    fn test_request_without_sampling_omits_options() {
        let body = OllamaClient::new().generate_request(&LlmRequest::new("Hello", "llama3.2"));
        assert!(body.options.is_none());
        assert!(body.format.is_none());
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.2", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "response": "{\"reasoning\": \"r\", \"agents\": []}",
                "done": true,
                "prompt_eval_count": 12,
                "eval_count": 8
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::with_base_url(server.uri());
        let reply = client
            .complete(&LlmRequest::new("route this", "llama3.2"))
            .await
            .unwrap();

        assert!(reply.content.contains("reasoning"));
        assert_eq!(reply.usage.map(|u| u.total()), Some(20));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_completion_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = OllamaClient::with_base_url(server.uri());
        let result = client.complete(&LlmRequest::new("x", "llama3.2")).await;

        match result {
            Err(AppError::Completion(msg)) => assert!(msg.contains("model not loaded")),
            other => panic!("Expected completion error, got {:?}", other.map(|r| r.content)),
        }
    }
}
