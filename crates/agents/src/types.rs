//! Routing and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the three retrieval agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    #[serde(rename = "PDF_RAG_AGENT")]
    Document,
    #[serde(rename = "WEB_SEARCH_AGENT")]
    Web,
    #[serde(rename = "ARXIV_AGENT")]
    Paper,
}

impl AgentId {
    /// Parse a wire name or short alias, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PDF_RAG_AGENT" | "DOCUMENT" | "PDF" => Some(Self::Document),
            "WEB_SEARCH_AGENT" | "WEB" => Some(Self::Web),
            "ARXIV_AGENT" | "PAPER" | "ARXIV" => Some(Self::Paper),
            _ => None,
        }
    }

    /// Name used in decisions, audit records and responses.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Document => "PDF_RAG_AGENT",
            Self::Web => "WEB_SEARCH_AGENT",
            Self::Paper => "ARXIV_AGENT",
        }
    }

    /// Header placed above this agent's context for the synthesizer.
    pub fn context_header(&self) -> &'static str {
        match self {
            Self::Document => "Context from PDF Document",
            Self::Web => "Context from Web Search",
            Self::Paper => "Context from ArXiv",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The controller's choice of agents for one query.
///
/// `agents` keeps the identifiers exactly as the backend produced them;
/// [`RoutingDecision::selected`] yields only the recognised ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub agents: Vec<String>,
}

impl RoutingDecision {
    pub fn new(reasoning: impl Into<String>, agents: &[AgentId]) -> Self {
        Self {
            reasoning: reasoning.into(),
            agents: agents.iter().map(|a| a.wire_name().to_string()).collect(),
        }
    }

    /// Decision used when the routing backend fails: web search only.
    pub fn fallback(reason: impl fmt::Display) -> Self {
        Self::new(
            format!("Controller LLM failed. Reason: {}", reason),
            &[AgentId::Web],
        )
    }

    /// Read a decision from a parsed reply object.
    ///
    /// Missing `reasoning` becomes empty, missing `agents` becomes empty, a
    /// bare string `agents` becomes a one-element list and non-string
    /// entries are dropped.
    pub fn from_value(value: &Value) -> Self {
        let reasoning = match value.get("reasoning") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let agents = match value.get("agents") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };

        Self { reasoning, agents }
    }

    /// Recognised agents in decision order, duplicates included.
    pub fn selected(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().filter_map(|name| {
            let parsed = AgentId::parse(name);
            if parsed.is_none() {
                tracing::debug!(agent = %name, "Ignoring unknown agent in decision");
            }
            parsed
        })
    }
}

/// What a retrieval agent returns for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub context: String,
    pub metadata: Value,
}

/// Per-agent entry of the response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDoc {
    pub agent: AgentId,
    pub metadata: Value,
}

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub query: String,
    pub controller_decision: RoutingDecision,
    pub final_answer: String,
    pub retrieved_docs: Vec<RetrievedDoc>,
}
