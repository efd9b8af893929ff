//! Ask command handler.
//!
//! Runs one question through the controller, the selected agents and the
//! synthesizer without starting the HTTP server.

use clap::Args;
use switchboard_agents::{AskResponse, Orchestrator};
use switchboard_core::{config::AppConfig, AppError, AppResult};

/// Ask a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Name of a previously uploaded document to consult
    #[arg(short, long)]
    pub document: Option<String>,

    /// Output the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if self.query.trim().is_empty() {
            return Err(AppError::InvalidInput("Query must not be empty".to_string()));
        }

        let orchestrator = Orchestrator::from_config(config)?;
        let response = orchestrator
            .handle(&self.query, self.document.as_deref())
            .await;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            println!("{}", render_text(&response));
        }

        Ok(())
    }
}

fn render_text(response: &AskResponse) -> String {
    let decision = &response.controller_decision;
    let agents = if decision.agents.is_empty() {
        "none".to_string()
    } else {
        decision.agents.join(", ")
    };

    let mut out = String::new();
    out.push_str(&response.final_answer);
    out.push_str("\n\n");
    out.push_str(&format!("Agents: {}\n", agents));
    out.push_str(&format!("Reasoning: {}", decision.reasoning));

    for doc in &response.retrieved_docs {
        if let Some(error) = doc.metadata.get("error").and_then(|e| e.as_str()) {
            out.push_str(&format!("\nWarning: {} failed: {}", doc.agent, error));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchboard_agents::{AgentId, RetrievedDoc, RoutingDecision};

    #[test]
    fn test_render_text_lists_agents_and_failures() {
        let response = AskResponse {
            query: "q".to_string(),
            controller_decision: RoutingDecision::new("needs both", &[AgentId::Web, AgentId::Paper]),
            final_answer: "The answer.".to_string(),
            retrieved_docs: vec![
                RetrievedDoc {
                    agent: AgentId::Web,
                    metadata: json!({"error": "Retrieval failed: timeout"}),
                },
                RetrievedDoc {
                    agent: AgentId::Paper,
                    metadata: json!({"source": "ArXiv Search"}),
                },
            ],
        };

        let text = render_text(&response);
        assert!(text.starts_with("The answer.\n\nAgents: WEB_SEARCH_AGENT, ARXIV_AGENT\n"));
        assert!(text.contains("Reasoning: needs both"));
        assert!(text.contains("Warning: WEB_SEARCH_AGENT failed: Retrieval failed: timeout"));
        assert!(!text.contains("ARXIV_AGENT failed"));
    }
}
