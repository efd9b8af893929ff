//! Query routing and retrieval agents for Switchboard.
//!
//! A [`Controller`] asks the completion backend which agents suit a query,
//! the [`Orchestrator`] runs those agents in order and concatenates their
//! context, and the [`Synthesizer`] turns that context into the answer.
//!
//! # Agents
//! - **Document**: passages from an uploaded document
//! - **Web**: DuckDuckGo Instant Answer snippets
//! - **Paper**: arXiv search results

pub mod agent;
pub mod audit;
pub mod controller;
pub mod document;
pub mod orchestrator;
pub mod paper;
pub mod reply;
mod request;
pub mod synthesizer;
pub mod types;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use agent::RetrievalAgent;
pub use audit::{AuditLog, AuditRecord};
pub use controller::Controller;
pub use document::DocumentAgent;
pub use orchestrator::Orchestrator;
pub use paper::PaperAgent;
pub use reply::{parse_reply, ReplyParse};
pub use synthesizer::Synthesizer;
pub use types::{AgentId, AgentOutput, AskResponse, RetrievedDoc, RoutingDecision};
pub use web::WebAgent;
