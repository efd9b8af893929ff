//! Document library type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document that has been indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Unique source identifier
    pub id: String,

    /// Path of the document on disk
    pub path: String,

    /// Content type ("pdf", "markdown", "text")
    pub content_type: String,

    /// SHA-256 of the document bytes, hex encoded
    pub sha256: String,

    /// When this source was indexed
    pub indexed_at: DateTime<Utc>,

    /// Document size in bytes
    pub size_bytes: u64,
}

/// A passage of document text with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Unique passage identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within the source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Byte span and other per-passage details
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Passage produced by the chunker, before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub source_id: String,
    pub position: u32,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// A passage returned by similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub passage: Passage,
    pub score: f32,
}

/// Whether `open_or_build` reused a persisted index or built a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Built,
    Reused,
}

/// Response body for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    pub detail: String,
}

impl UploadReceipt {
    /// Receipt for a document that was saved and indexed.
    pub fn processed(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            detail: "File uploaded and processed successfully.".to_string(),
        }
    }
}

/// Statistics for one document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Index identity (document base name)
    pub identity: String,

    /// Number of sources
    pub sources_count: u32,

    /// Number of passages
    pub passages_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,
}
