//! Routing controller: picks the agents for a query.

use std::collections::HashMap;
use std::sync::Arc;
use switchboard_core::AppResult;
use switchboard_llm::LlmClient;
use switchboard_prompt::{build_prompt, PromptDefinition};

use crate::audit::{AuditLog, AuditRecord};
use crate::reply::parse_reply;
use crate::request::completion_request;
use crate::types::RoutingDecision;

/// Asks the completion backend which agents should handle a query.
pub struct Controller {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    audit: AuditLog,
}

impl Controller {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        audit: AuditLog,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            audit,
        }
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Decide which agents to call.
    ///
    /// Never fails: any backend or parse failure yields the web-only
    /// fallback decision. Every call appends exactly one audit record.
    pub async fn decide(&self, query: &str, document_available: bool) -> RoutingDecision {
        let decision = match self.request_decision(query, document_available).await {
            Ok(decision) => {
                tracing::info!(
                    agents = ?decision.agents,
                    reasoning = %decision.reasoning,
                    "Routing decision"
                );
                decision
            }
            Err(e) => {
                tracing::warn!("Routing failed, falling back to web search: {}", e);
                RoutingDecision::fallback(&e)
            }
        };

        if let Err(e) = self.audit.append(&AuditRecord::new(query, decision.clone())) {
            tracing::warn!(path = ?self.audit.path(), "Failed to write audit record: {}", e);
        }

        decision
    }

    async fn request_decision(
        &self,
        query: &str,
        document_available: bool,
    ) -> AppResult<RoutingDecision> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert(
            "document_available".to_string(),
            if document_available { "True" } else { "False" }.to_string(),
        );

        let built = build_prompt(&self.prompt, variables)?;
        let request = completion_request(built, &self.model);

        let raw = self.client.complete_text(&request).await?;
        tracing::debug!(chars = raw.len(), "Controller reply received");

        let value = parse_reply(&raw).into_result()?;
        Ok(RoutingDecision::from_value(&value))
    }
}
