//! Completion request/response types and the backend trait.
//!
//! Both the routing controller and the answer synthesizer send a single
//! rendered prompt and read back plain text; nothing here streams.

use serde::{Deserialize, Serialize};
use switchboard_core::{AppError, AppResult};

/// One completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Rendered user prompt
    pub prompt: String,

    /// Instructions sent ahead of the prompt, if the backend supports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Upper bound on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Ask the backend to constrain its reply to a JSON document
    #[serde(default)]
    pub json_output: bool,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            json_output: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Text returned by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,

    /// Model that answered, as reported by the backend
    pub model: String,

    /// Token accounting, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A text-completion backend.
///
/// Implementations map transport failures, error statuses (rate limits
/// included) and undecodable bodies to `AppError::Completion`.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name for logs, e.g. "ollama".
    fn provider_name(&self) -> &str;

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;

    /// Complete and return only the text. A blank reply is an error.
    async fn complete_text(&self, request: &LlmRequest) -> AppResult<String> {
        let response = self.complete(request).await?;
        if response.content.trim().is_empty() {
            return Err(AppError::Completion(format!(
                "{} returned an empty reply",
                self.provider_name()
            )));
        }
        Ok(response.content)
    }
}
