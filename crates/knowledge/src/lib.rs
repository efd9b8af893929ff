//! Document library and passage retrieval for Switchboard.
//!
//! Uploaded documents are parsed, split into overlapping passages, embedded,
//! and persisted in a per-document SQLite index. Searches rank passages by
//! cosine similarity against the embedded query.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod library;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use library::{DocumentLibrary, PassageIndex, INVALID_FILE_TYPE};
pub use types::{
    ChunkCandidate, IndexStats, IndexStatus, IndexedSource, Passage, SearchHit, UploadReceipt,
};
