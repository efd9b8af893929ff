//! Web search through the DuckDuckGo Instant Answer API.
//!
//! API: https://api.duckduckgo.com/?q=rust&format=json&no_html=1&skip_disambig=1

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use switchboard_core::{AppError, AppResult};

use crate::agent::RetrievalAgent;
use crate::types::{AgentId, AgentOutput};

pub const WEB_SOURCE: &str = "DuckDuckGo Search";
pub const NO_WEB_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// Web search agent.
pub struct WebAgent {
    endpoint: String,
    max_results: usize,
    client: reqwest::Client,
}

impl WebAgent {
    pub fn new(endpoint: impl Into<String>, max_results: usize) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            max_results,
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

    /// Snippets from an Instant Answer payload, best first.
    fn snippets(&self, payload: &Value) -> Vec<String> {
        let mut snippets = Vec::new();

        for key in ["Answer", "AbstractText", "Definition"] {
            if let Some(text) = payload.get(key).and_then(Value::as_str) {
                push_snippet(&mut snippets, text);
            }
        }

        if let Some(topics) = payload.get("RelatedTopics").and_then(Value::as_array) {
            collect_topics(topics, &mut snippets);
        }

        snippets.truncate(self.max_results);
        snippets
    }
}

/// Related topics are either `{Text, FirstURL}` or a named group `{Name, Topics}`.
fn collect_topics(topics: &[Value], out: &mut Vec<String>) {
    for topic in topics {
        if let Some(text) = topic.get("Text").and_then(Value::as_str) {
            push_snippet(out, text);
        } else if let Some(nested) = topic.get("Topics").and_then(Value::as_array) {
            collect_topics(nested, out);
        }
    }
}

fn push_snippet(out: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() && !out.iter().any(|s| s == text) {
        out.push(text.to_string());
    }
}

#[async_trait]
impl RetrievalAgent for WebAgent {
    fn id(&self) -> AgentId {
        AgentId::Web
    }

    async fn query(&self, text: &str) -> AppResult<AgentOutput> {
        tracing::debug!(query = %text, "Searching DuckDuckGo");

        let url = format!("{}/", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", text),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("DuckDuckGo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "DuckDuckGo API error ({})",
                response.status()
            )));
        }

        // The API labels its JSON as javascript, so decode the body by hand.
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read DuckDuckGo response: {}", e)))?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Retrieval(format!("Invalid DuckDuckGo response: {}", e)))?;

        let snippets = self.snippets(&payload);
        tracing::debug!(snippets = snippets.len(), "DuckDuckGo search finished");

        let context = if snippets.is_empty() {
            NO_WEB_RESULTS.to_string()
        } else {
            snippets.join("\n")
        };

        Ok(AgentOutput {
            context,
            metadata: json!({ "source": WEB_SOURCE }),
        })
    }
}
