//! Passage retrieval over an uploaded document.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use switchboard_core::{AppError, AppResult};
use switchboard_knowledge::DocumentLibrary;

use crate::agent::RetrievalAgent;
use crate::types::{AgentId, AgentOutput};

/// Separator between passages in the agent context.
pub const PASSAGE_SEPARATOR: &str = "\n---\n";

/// Document agent bound to one resolved upload.
pub struct DocumentAgent {
    library: DocumentLibrary,
    path: PathBuf,
    top_k: usize,
}

impl DocumentAgent {
    pub fn new(library: DocumentLibrary, path: impl Into<PathBuf>, top_k: usize) -> Self {
        Self {
            library,
            path: path.into(),
            top_k,
        }
    }
}

#[async_trait]
impl RetrievalAgent for DocumentAgent {
    fn id(&self) -> AgentId {
        AgentId::Document
    }

    async fn query(&self, text: &str) -> AppResult<AgentOutput> {
        let hits = self
            .library
            .search(&self.path, text, self.top_k)
            .await
            .map_err(|e| AppError::Retrieval(format!("Document search failed: {}", e)))?;

        tracing::debug!(path = ?self.path, hits = hits.len(), "Document search finished");

        let context = hits
            .iter()
            .map(|hit| hit.passage.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let metadata: Vec<Value> = hits
            .iter()
            .map(|hit| {
                json!({
                    "source": hit.passage.metadata.get("source").cloned().unwrap_or(Value::Null),
                    "position": hit.passage.position,
                    "score": hit.score,
                })
            })
            .collect();

        Ok(AgentOutput {
            context,
            metadata: Value::Array(metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{library, write_upload};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_query_returns_joined_passages_and_metadata() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp).with_chunking(60, 0);
        let path = write_upload(
            &temp,
            "notes.md",
            "Photosynthesis converts light into chemical energy in plants. \
             Mitochondria are the powerhouse of the cell and make ATP. \
             Volcanoes erupt when magma rises through the crust of the earth.",
        );

        let agent = DocumentAgent::new(lib, &path, 2);
        let output = agent.query("mitochondria ATP cell").await.unwrap();

        let passages: Vec<&str> = output.context.split(PASSAGE_SEPARATOR).collect();
        assert_eq!(passages.len(), 2);
        assert!(passages[0].contains("Mitochondria"));

        let entries = output.metadata.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["source"], path.to_string_lossy().as_ref());
        assert!(entries[0]["score"].as_f64().unwrap() >= entries[1]["score"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn test_missing_document_is_retrieval_error() {
        let temp = TempDir::new().unwrap();
        let agent = DocumentAgent::new(library(&temp), temp.path().join("gone.md"), 4);

        let err = agent.query("anything").await.unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
    }
}
