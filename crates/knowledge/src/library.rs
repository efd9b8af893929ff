//! Document library: uploads, per-document passage indexes, and search.

use crate::chunker::chunk_text;
use crate::config::{
    get_index_path, load_manifest, save_manifest, IndexManifest, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index;
use crate::parser::{parse_bytes, ContentType};
use crate::types::{
    IndexStats, IndexStatus, IndexedSource, Passage, SearchHit, UploadReceipt,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchboard_core::{AppConfig, AppError, AppResult};

/// Message returned for uploads that are not PDFs.
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a PDF.";

/// Handle to a persisted passage index.
#[derive(Debug, Clone)]
pub struct PassageIndex {
    identity: String,
    path: PathBuf,
}

impl PassageIndex {
    /// Index identity (document base name).
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Path of the SQLite file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-k passages by cosine similarity to `query_embedding`.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>> {
        let conn = index::init_index(&self.path)?;
        index::query_passages(&conn, query_embedding, top_k)
    }
}

/// Uploaded documents and their passage indexes.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    uploads_dir: PathBuf,
    index_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentLibrary {
    pub fn new(
        uploads_dir: impl Into<PathBuf>,
        index_dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            index_dir: index_dir.into(),
            embedder,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }

    /// Build a library from application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_provider(&config.embedding)?;
        Ok(Self::new(config.uploads_dir(), config.index_dir(), embedder))
    }

    /// Override passage size and overlap.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.chunk_overlap = chunk_overlap.min(self.chunk_size.saturating_sub(1));
        self
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Check that an upload name is a plain `.pdf` file name.
    pub fn validate_upload_name(filename: &str) -> AppResult<()> {
        if !filename.ends_with(".pdf") {
            return Err(AppError::InvalidInput(INVALID_FILE_TYPE.to_string()));
        }

        if !is_plain_name(filename) || filename == ".pdf" {
            return Err(AppError::InvalidInput(format!(
                "Invalid file name: {}",
                filename
            )));
        }

        Ok(())
    }

    /// Save an uploaded PDF and build its passage index.
    ///
    /// If indexing fails the saved file is removed again, so a document is
    /// only ever resolvable once it can be searched.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> AppResult<UploadReceipt> {
        Self::validate_upload_name(filename)?;

        std::fs::create_dir_all(&self.uploads_dir)?;
        let path = self.uploads_dir.join(filename);
        std::fs::write(&path, bytes)?;

        tracing::info!(filename = %filename, bytes = bytes.len(), "Saved upload");

        if let Err(e) = self.open_or_build(&path).await {
            tracing::warn!(filename = %filename, "Indexing failed, discarding upload: {}", e);
            if let Err(remove_err) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to remove {:?}: {}", path, remove_err);
            }
            return Err(e);
        }

        Ok(UploadReceipt::processed(filename))
    }

    /// Resolve a client-supplied document reference to an uploaded file.
    ///
    /// Absent, empty and `"null"` references resolve to nothing, as do
    /// names containing path separators or `..`.
    pub fn resolve(&self, reference: Option<&str>) -> Option<PathBuf> {
        let name = reference.map(str::trim).filter(|r| !r.is_empty() && *r != "null")?;

        if !is_plain_name(name) {
            tracing::debug!(reference = %name, "Rejected document reference");
            return None;
        }

        let path = self.uploads_dir.join(name);
        path.is_file().then_some(path)
    }

    /// Index identity for a document: its base name without extension.
    pub fn identity(path: &Path) -> AppResult<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Knowledge(format!("No index identity for {:?}", path)))
    }

    /// Open the persisted index for `path`, building it first if needed.
    ///
    /// An existing index is rebuilt when the document bytes or the embedding
    /// settings changed since it was written.
    pub async fn open_or_build(&self, path: &Path) -> AppResult<(PassageIndex, IndexStatus)> {
        let identity = Self::identity(path)?;
        let index_path = get_index_path(&self.index_dir, &identity);
        let handle = PassageIndex {
            identity: identity.clone(),
            path: index_path.clone(),
        };

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;
        let digest = sha256_hex(&bytes);
        let manifest = self.manifest(&identity);

        if index_path.exists() && self.is_current(&identity, &index_path, &digest, &manifest)? {
            tracing::info!(identity = %identity, "Reusing passage index");
            return Ok((handle, IndexStatus::Reused));
        }

        tracing::info!(identity = %identity, "Building passage index");

        let content_type = ContentType::from_path(path);
        let text = parse_bytes(&bytes, content_type)?;
        if text.trim().is_empty() {
            tracing::warn!(identity = %identity, "Document has no extractable text");
        }

        let source = IndexedSource {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_string_lossy().to_string(),
            content_type: content_type.as_str().to_string(),
            sha256: digest,
            indexed_at: Utc::now(),
            size_bytes: bytes.len() as u64,
        };

        let candidates = chunk_text(&source.id, &text, self.chunk_size, self.chunk_overlap);
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != candidates.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} passages",
                embeddings.len(),
                candidates.len()
            )));
        }

        let passages: Vec<Passage> = candidates
            .into_iter()
            .zip(embeddings)
            .map(|(candidate, embedding)| {
                let mut metadata = candidate.metadata;
                metadata["source"] = serde_json::Value::String(source.path.clone());
                Passage {
                    id: uuid::Uuid::new_v4().to_string(),
                    source_id: candidate.source_id,
                    position: candidate.position,
                    text: candidate.text,
                    embedding: Some(embedding),
                    metadata,
                }
            })
            .collect();

        let mut conn = index::init_index(&index_path)?;
        index::replace_document(&mut conn, &source, &passages)?;
        save_manifest(&self.index_dir, &manifest)?;

        tracing::info!(
            identity = %identity,
            passages = passages.len(),
            "Passage index built"
        );

        Ok((handle, IndexStatus::Built))
    }

    /// Top-k passages of the document at `path` for `query`.
    pub async fn search(&self, path: &Path, query: &str, top_k: usize) -> AppResult<Vec<SearchHit>> {
        let (handle, _) = self.open_or_build(path).await?;
        let query_embedding = self.embedder.embed(query).await?;
        handle.search(&query_embedding, top_k)
    }

    /// Statistics for an existing index.
    pub fn stats(&self, identity: &str) -> AppResult<IndexStats> {
        let index_path = get_index_path(&self.index_dir, identity);
        if !index_path.exists() {
            return Err(AppError::Knowledge(format!(
                "No passage index for '{}'",
                identity
            )));
        }

        let conn = index::init_index(&index_path)?;
        let (sources_count, passages_count) = index::get_stats(&conn)?;
        let db_size_bytes = std::fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0);

        Ok(IndexStats {
            identity: identity.to_string(),
            sources_count,
            passages_count,
            db_size_bytes,
        })
    }

    fn manifest(&self, identity: &str) -> IndexManifest {
        IndexManifest {
            identity: identity.to_string(),
            embedding_provider: self.embedder.provider_name().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
            dimensions: self.embedder.dimensions(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }

    fn is_current(
        &self,
        identity: &str,
        index_path: &Path,
        digest: &str,
        manifest: &IndexManifest,
    ) -> AppResult<bool> {
        let compatible = load_manifest(&self.index_dir, identity)?
            .map(|stored| stored.is_compatible_with(manifest))
            .unwrap_or(false);
        if !compatible {
            tracing::info!(identity = %identity, "Embedding settings changed");
            return Ok(false);
        }

        let conn = index::init_index(index_path)?;
        let unchanged = index::source_digest(&conn)?.as_deref() == Some(digest);
        if !unchanged {
            tracing::info!(identity = %identity, "Document changed since indexing");
        }
        Ok(unchanged)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use tempfile::TempDir;

    /// Single-page PDF with one line of Helvetica text.
    pub(crate) fn minimal_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
        }

        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{:010} 00000 n \n", offset));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));

        pdf.into_bytes()
    }

    fn library(temp: &TempDir) -> DocumentLibrary {
        DocumentLibrary::new(
            temp.path().join("uploads"),
            temp.path().join("index"),
            Arc::new(TrigramProvider::new(256)),
        )
    }

    fn write_upload(temp: &TempDir, name: &str, contents: &str) -> PathBuf {
        let dir = temp.path().join("uploads");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_validate_upload_name() {
        assert!(DocumentLibrary::validate_upload_name("paper.pdf").is_ok());

        let err = DocumentLibrary::validate_upload_name("notes.txt").unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid input: {}", INVALID_FILE_TYPE));

        assert!(DocumentLibrary::validate_upload_name("../escape.pdf").is_err());
        assert!(DocumentLibrary::validate_upload_name("dir/paper.pdf").is_err());
        assert!(DocumentLibrary::validate_upload_name(".pdf").is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);

        let result = lib.upload("x.txt", b"hello").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(!temp.path().join("uploads/x.txt").exists());
        assert!(!temp.path().join("index/x").exists());
    }

    #[tokio::test]
    async fn test_upload_pdf_builds_index() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);

        let receipt = lib
            .upload("x.pdf", &minimal_pdf("Switchboard routes questions"))
            .await
            .unwrap();

        assert_eq!(receipt, UploadReceipt::processed("x.pdf"));
        assert!(temp.path().join("uploads/x.pdf").is_file());
        assert!(temp.path().join("index/x/index.sqlite").is_file());
        assert!(temp.path().join("index/x/config.yaml").is_file());

        let path = lib.resolve(Some("x.pdf")).unwrap();
        let (_, status) = lib.open_or_build(&path).await.unwrap();
        assert_eq!(status, IndexStatus::Reused);
    }

    #[tokio::test]
    async fn test_upload_of_broken_pdf_is_discarded() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);

        let result = lib.upload("broken.pdf", b"not really a pdf").await;
        assert!(result.is_err());
        assert!(lib.resolve(Some("broken.pdf")).is_none());
    }

    #[test]
    fn test_resolve() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);
        write_upload(&temp, "paper.pdf", "x");

        assert!(lib.resolve(Some("paper.pdf")).is_some());
        assert!(lib.resolve(Some("missing.pdf")).is_none());
        assert!(lib.resolve(Some("null")).is_none());
        assert!(lib.resolve(Some("  ")).is_none());
        assert!(lib.resolve(Some("../paper.pdf")).is_none());
        assert!(lib.resolve(None).is_none());
    }

    #[test]
    fn test_identity_strips_extension() {
        assert_eq!(
            DocumentLibrary::identity(Path::new("/u/attention.pdf")).unwrap(),
            "attention"
        );
    }

    #[tokio::test]
    async fn test_open_or_build_then_reuse() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);
        let path = write_upload(&temp, "notes.txt", &"Rust ownership rules. ".repeat(200));

        let (index, first) = lib.open_or_build(&path).await.unwrap();
        assert_eq!(first, IndexStatus::Built);
        assert_eq!(index.identity(), "notes");

        let (_, second) = lib.open_or_build(&path).await.unwrap();
        assert_eq!(second, IndexStatus::Reused);

        let stats = lib.stats("notes").unwrap();
        assert_eq!(stats.sources_count, 1);
        assert!(stats.passages_count > 1);
    }

    #[tokio::test]
    async fn test_changed_document_is_rebuilt() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp);
        let path = write_upload(&temp, "notes.txt", "first version");
        lib.open_or_build(&path).await.unwrap();

        std::fs::write(&path, "second version").unwrap();
        let (_, status) = lib.open_or_build(&path).await.unwrap();
        assert_eq!(status, IndexStatus::Built);
        assert_eq!(lib.stats("notes").unwrap().passages_count, 1);
    }

    #[tokio::test]
    async fn test_changed_embedding_settings_rebuild() {
        let temp = TempDir::new().unwrap();
        let path = write_upload(&temp, "notes.txt", "some text to index");
        library(&temp).open_or_build(&path).await.unwrap();

        let wider = DocumentLibrary::new(
            temp.path().join("uploads"),
            temp.path().join("index"),
            Arc::new(TrigramProvider::new(512)),
        );
        let (_, status) = wider.open_or_build(&path).await.unwrap();
        assert_eq!(status, IndexStatus::Built);
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_passage_first() {
        let temp = TempDir::new().unwrap();
        let lib = library(&temp).with_chunking(70, 0);
        let doc = format!(
            "{}\n\n{}\n\n{}",
            "Sourdough bread needs flour, water, salt and a long fermentation.",
            "Transformers rely on attention layers to weigh every token.",
            "Gardening tips: water tomatoes early in the morning."
        );
        let path = write_upload(&temp, "mixed.txt", &doc);

        let hits = lib.search(&path, "attention layers in transformers", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].passage.text.contains("attention"));
        assert!(hits[0].passage.metadata["source"]
            .as_str()
            .unwrap()
            .ends_with("mixed.txt"));
    }
}
