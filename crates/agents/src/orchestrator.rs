//! Per-request pipeline: route, retrieve, synthesize.

use serde_json::json;
use std::sync::Arc;
use switchboard_core::{AppConfig, AppError, AppResult};
use switchboard_knowledge::DocumentLibrary;
use switchboard_llm::create_client;
use switchboard_prompt::{load_prompt, CONTROLLER_ROUTE, SYNTHESIZER_ANSWER};

use crate::agent::RetrievalAgent;
use crate::audit::AuditLog;
use crate::controller::Controller;
use crate::document::DocumentAgent;
use crate::paper::PaperAgent;
use crate::synthesizer::Synthesizer;
use crate::types::{AgentId, AskResponse, RetrievedDoc};
use crate::web::WebAgent;

/// Default number of passages pulled from a document.
pub const DEFAULT_DOCUMENT_TOP_K: usize = 4;

/// Answers questions by routing them through the retrieval agents.
///
/// Agents run one after another in decision order; the web and paper
/// agents are shared, the document agent is bound per request to the
/// resolved upload.
pub struct Orchestrator {
    controller: Controller,
    synthesizer: Synthesizer,
    library: DocumentLibrary,
    web: Arc<dyn RetrievalAgent>,
    paper: Arc<dyn RetrievalAgent>,
    document_top_k: usize,
}

impl Orchestrator {
    pub fn new(
        controller: Controller,
        synthesizer: Synthesizer,
        library: DocumentLibrary,
        web: Arc<dyn RetrievalAgent>,
        paper: Arc<dyn RetrievalAgent>,
    ) -> Self {
        Self {
            controller,
            synthesizer,
            library,
            web,
            paper,
            document_top_k: DEFAULT_DOCUMENT_TOP_K,
        }
    }

    pub fn with_document_top_k(mut self, top_k: usize) -> Self {
        self.document_top_k = top_k.max(1);
        self
    }

    /// Wire every component from application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider = config.provider.as_str();
        let api_key = config.resolve_api_key(provider);
        let endpoint = config.provider_endpoint();

        let client = create_client(
            provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            config.provider_timeout(),
        )
        .map_err(AppError::Config)?;

        tracing::info!(
            provider = %client.provider_name(),
            model = %config.model,
            "Completion backend ready"
        );

        let controller = Controller::new(
            client.clone(),
            &config.model,
            load_prompt(&config.workspace, CONTROLLER_ROUTE)?,
            AuditLog::new(config.audit_log_path()),
        );
        let synthesizer = Synthesizer::new(
            client,
            &config.model,
            load_prompt(&config.workspace, SYNTHESIZER_ANSWER)?,
        );

        let agents = &config.agents;
        let mut web = WebAgent::new(&agents.web_endpoint, agents.web_max_results);
        let mut paper = PaperAgent::new(&agents.paper_endpoint, agents.paper_max_results);
        if let Some(secs) = agents.request_timeout_secs {
            web = web.with_timeout(secs);
            paper = paper.with_timeout(secs);
        }

        Ok(Self::new(
            controller,
            synthesizer,
            DocumentLibrary::from_config(config)?,
            Arc::new(web),
            Arc::new(paper),
        )
        .with_document_top_k(agents.document_top_k))
    }

    pub fn library(&self) -> &DocumentLibrary {
        &self.library
    }

    pub fn audit(&self) -> &AuditLog {
        self.controller.audit()
    }

    /// Answer one question, optionally about an uploaded document.
    ///
    /// Agent failures are recorded as `{"error": ..}` metadata and never
    /// abort the request.
    pub async fn handle(&self, query: &str, document_reference: Option<&str>) -> AskResponse {
        let document = self.library.resolve(document_reference);
        if document_reference.is_some() && document.is_none() {
            tracing::debug!(reference = ?document_reference, "Document reference not resolvable");
        }

        let decision = self.controller.decide(query, document.is_some()).await;

        let mut context = String::new();
        let mut retrieved_docs = Vec::new();

        for agent_id in decision.selected() {
            let agent: Arc<dyn RetrievalAgent> = match agent_id {
                AgentId::Document => match &document {
                    Some(path) => Arc::new(DocumentAgent::new(
                        self.library.clone(),
                        path.clone(),
                        self.document_top_k,
                    )),
                    None => {
                        tracing::debug!("Skipping document agent, no document available");
                        continue;
                    }
                },
                AgentId::Web => self.web.clone(),
                AgentId::Paper => self.paper.clone(),
            };

            tracing::info!(agent = %agent_id, "Invoking agent");

            match agent.query(query).await {
                Ok(output) => {
                    if !output.context.trim().is_empty() {
                        context.push_str(&format!(
                            "\n\n--- {} ---\n{}",
                            agent_id.context_header(),
                            output.context
                        ));
                    }
                    retrieved_docs.push(RetrievedDoc {
                        agent: agent_id,
                        metadata: output.metadata,
                    });
                }
                Err(e) => {
                    tracing::warn!(agent = %agent_id, "Agent failed: {}", e);
                    retrieved_docs.push(RetrievedDoc {
                        agent: agent_id,
                        metadata: json!({ "error": e.to_string() }),
                    });
                }
            }
        }

        let final_answer = self.synthesizer.synthesize(query, &context).await;

        AskResponse {
            query: query.to_string(),
            controller_decision: decision,
            final_answer,
            retrieved_docs,
        }
    }
}
