//! Per-index manifest and on-disk layout.
//!
//! Each document gets its own directory under the index root:
//!
//! ```text
//! <index_dir>/<identity>/index.sqlite
//! <index_dir>/<identity>/config.yaml
//! ```
//!
//! The manifest records how the index was built so a later open can tell
//! whether the stored vectors are still comparable with the current
//! embedding provider.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use switchboard_core::{AppError, AppResult};

/// Characters per passage.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared between consecutive passages.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Build parameters stored next to an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub identity: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl IndexManifest {
    /// Whether vectors built under `other` can be searched with this manifest.
    pub fn is_compatible_with(&self, other: &IndexManifest) -> bool {
        self.embedding_provider == other.embedding_provider
            && self.embedding_model == other.embedding_model
            && self.dimensions == other.dimensions
            && self.chunk_size == other.chunk_size
            && self.chunk_overlap == other.chunk_overlap
    }
}

/// Directory holding one document's index.
pub fn get_index_dir(index_root: &Path, identity: &str) -> PathBuf {
    index_root.join(identity)
}

/// SQLite index path for a document.
pub fn get_index_path(index_root: &Path, identity: &str) -> PathBuf {
    get_index_dir(index_root, identity).join("index.sqlite")
}

/// Manifest path for a document.
pub fn get_manifest_path(index_root: &Path, identity: &str) -> PathBuf {
    get_index_dir(index_root, identity).join("config.yaml")
}

/// Load a manifest, returning `None` if it was never written.
pub fn load_manifest(index_root: &Path, identity: &str) -> AppResult<Option<IndexManifest>> {
    let path = get_manifest_path(index_root, identity);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read manifest at {:?}: {}", path, e))
    })?;

    let manifest = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse manifest at {:?}: {}", path, e))
    })?;

    Ok(Some(manifest))
}

/// Save a manifest next to its index.
pub fn save_manifest(index_root: &Path, manifest: &IndexManifest) -> AppResult<()> {
    let path = get_manifest_path(index_root, &manifest.identity);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Knowledge(format!("Failed to create index directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(manifest)?;
    fs::write(&path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write manifest to {:?}: {}", path, e))
    })?;

    tracing::debug!(identity = %manifest.identity, "Saved index manifest");
    Ok(())
}
