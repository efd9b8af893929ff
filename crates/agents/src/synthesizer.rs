//! Final answer synthesis from aggregated agent context.

use std::collections::HashMap;
use std::sync::Arc;
use switchboard_core::AppResult;
use switchboard_llm::LlmClient;
use switchboard_prompt::{build_prompt, PromptDefinition};

use crate::request::completion_request;

/// Context used when no agent produced anything.
pub const NO_CONTEXT: &str =
    "No information was found by the agents. Please rely on your general knowledge.";

/// Answer returned when the backend fails.
pub const SYNTHESIS_FAILED: &str =
    "Sorry, I encountered an error while generating the final answer.";

pub struct Synthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl Synthesizer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    /// Answer `query` from `context`. Never fails.
    pub async fn synthesize(&self, query: &str, context: &str) -> String {
        match self.generate(query, context).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Answer synthesis failed: {}", e);
                SYNTHESIS_FAILED.to_string()
            }
        }
    }

    async fn generate(&self, query: &str, context: &str) -> AppResult<String> {
        let context = if context.trim().is_empty() {
            NO_CONTEXT
        } else {
            context
        };

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("context".to_string(), context.to_string());

        let built = build_prompt(&self.prompt, variables)?;
        let request = completion_request(built, &self.model);

        let answer = self.client.complete_text(&request).await?;
        Ok(answer.trim().to_string())
    }
}
