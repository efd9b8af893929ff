//! Fakes shared by the unit tests of this crate.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use switchboard_core::{AppError, AppResult};
use switchboard_knowledge::embeddings::providers::TrigramProvider;
use switchboard_knowledge::DocumentLibrary;
use switchboard_llm::{LlmClient, LlmRequest, LlmResponse};
use tempfile::TempDir;

use crate::agent::RetrievalAgent;
use crate::types::{AgentId, AgentOutput};

/// Completion client that replays queued replies and records requests.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<AppResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Completion("no scripted reply".to_string())))?;

        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: None,
        })
    }
}

/// Agent returning a fixed output, or failing, and counting calls.
pub struct StaticAgent {
    id: AgentId,
    output: Result<AgentOutput, String>,
    calls: Mutex<Vec<String>>,
}

impl StaticAgent {
    pub fn ok(id: AgentId, context: &str, metadata: Value) -> Arc<Self> {
        Arc::new(Self {
            id,
            output: Ok(AgentOutput {
                context: context.to_string(),
                metadata,
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(id: AgentId, message: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            output: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalAgent for StaticAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    async fn query(&self, text: &str) -> AppResult<AgentOutput> {
        self.calls.lock().unwrap().push(text.to_string());
        self.output
            .clone()
            .map_err(AppError::Retrieval)
    }
}

/// Document library rooted in a temporary directory.
pub fn library(temp: &TempDir) -> DocumentLibrary {
    DocumentLibrary::new(
        temp.path().join("uploads"),
        temp.path().join("index"),
        Arc::new(TrigramProvider::new(256)),
    )
}

/// Place a file directly in the uploads directory.
pub fn write_upload(temp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let dir = temp.path().join("uploads");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
