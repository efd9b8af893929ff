//! SQLite-backed passage index.
//!
//! Passages are stored with their embedding as a little-endian `f32` blob.
//! Search loads every passage and ranks by cosine similarity, which is
//! adequate for the single-document indexes this crate builds.

use crate::types::{IndexedSource, Passage, SearchHit};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use switchboard_core::{AppError, AppResult};

/// Open (creating if needed) the SQLite index database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            content_type TEXT NOT NULL,
            sha256 TEXT NOT NULL,
            indexed_at TEXT NOT NULL,
            size_bytes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS passages (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        );

        CREATE INDEX IF NOT EXISTS idx_passages_source ON passages(source_id);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Replace the index contents with one source and its passages.
///
/// Runs in a single transaction, so concurrent builders of the same index
/// never leave a mix of old and new passages behind.
pub fn replace_document(
    conn: &mut Connection,
    source: &IndexedSource,
    passages: &[Passage],
) -> AppResult<()> {
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

    tx.execute_batch("DELETE FROM passages; DELETE FROM sources;")
        .map_err(|e| AppError::Knowledge(format!("Failed to clear index: {}", e)))?;

    tx.execute(
        "INSERT OR REPLACE INTO sources (id, path, content_type, sha256, indexed_at, size_bytes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            source.id,
            source.path,
            source.content_type,
            source.sha256,
            source.indexed_at.to_rfc3339(),
            source.size_bytes as i64,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert source: {}", e)))?;

    for passage in passages {
        insert_passage(&tx, passage)?;
    }

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit index: {}", e)))?;

    Ok(())
}

/// Insert a passage with embedding into the index.
pub fn insert_passage(conn: &Connection, passage: &Passage) -> AppResult<()> {
    let embedding_bytes = embedding_to_bytes(
        passage
            .embedding
            .as_ref()
            .ok_or_else(|| AppError::Knowledge("Passage missing embedding".to_string()))?,
    );

    let metadata_json = serde_json::to_string(&passage.metadata)?;

    conn.execute(
        "INSERT OR REPLACE INTO passages (id, source_id, position, text, embedding, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            passage.id,
            passage.source_id,
            passage.position as i64,
            passage.text,
            embedding_bytes,
            metadata_json,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert passage: {}", e)))?;

    Ok(())
}

/// Digest of the most recently indexed source, if any.
pub fn source_digest(conn: &Connection) -> AppResult<Option<String>> {
    conn.query_row(
        "SELECT sha256 FROM sources ORDER BY indexed_at DESC LIMIT 1",
        [],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| AppError::Knowledge(format!("Failed to read source digest: {}", e)))
}

/// Query the index for the top-k most similar passages.
pub fn query_passages(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<SearchHit>> {
    let mut stmt = conn
        .prepare("SELECT id, source_id, position, text, embedding, metadata FROM passages")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let metadata_json: Option<String> = row.get(5)?;

            Ok((
                Passage {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    position: row.get::<_, i64>(2)? as u32,
                    text: row.get(3)?,
                    embedding: None,
                    metadata: serde_json::Value::Null,
                },
                embedding_bytes,
                metadata_json,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query passages: {}", e)))?;

    let mut hits = Vec::new();
    for row in rows {
        let (mut passage, embedding_bytes, metadata_json) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read passage: {}", e)))?;

        let embedding = match bytes_to_embedding(&embedding_bytes) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(passage = %passage.id, "Skipping passage: {}", e);
                continue;
            }
        };

        passage.metadata = metadata_json
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or(serde_json::Value::Null);

        let score = cosine_similarity(query_embedding, &embedding);
        passage.embedding = Some(embedding);
        hits.push(SearchHit { passage, score });
    }

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(top_k);

    tracing::debug!("Retrieved {} passages (requested top-{})", hits.len(), top_k);

    Ok(hits)
}

/// Count sources and passages.
pub fn get_stats(conn: &Connection) -> AppResult<(u32, u32)> {
    let count = |sql: &str| -> AppResult<u32> {
        conn.query_row(sql, [], |row| row.get::<_, i64>(0).map(|v| v as u32))
            .map_err(|e| AppError::Knowledge(format!("Failed to count rows: {}", e)))
    };

    Ok((
        count("SELECT COUNT(*) FROM sources")?,
        count("SELECT COUNT(*) FROM passages")?,
    ))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
