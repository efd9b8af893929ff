//! Embedding providers for passage indexes.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
