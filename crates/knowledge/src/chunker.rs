//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;

/// Chunk text into overlapping passages of at most `chunk_size` bytes.
///
/// A window is cut at the last whitespace in its second half when one
/// exists, so words are not split across passages. Consecutive passages
/// share up to `overlap` bytes. Whitespace-only passages are dropped.
pub fn chunk_text(
    source_id: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<ChunkCandidate> {
    let chunk_size = chunk_size.max(1);
    let len = text.len();
    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0;

    while start < len {
        let mut end = floor_boundary(text, (start + chunk_size).min(len));

        if end < len {
            if let Some(ws) = text[start..end].rfind(char::is_whitespace) {
                if ws > chunk_size / 2 {
                    end = start + ws;
                }
            }
        }

        if end <= start {
            end = ceil_boundary(text, start + 1);
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(ChunkCandidate {
                source_id: source_id.to_string(),
                position,
                text: piece.to_string(),
                metadata: serde_json::json!({
                    "start": start,
                    "end": end,
                }),
            });
            position += 1;
        }

        if end >= len {
            break;
        }

        start = ceil_boundary(text, end.saturating_sub(overlap).max(start + 1));
    }

    tracing::debug!(
        "Chunked text into {} passages (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_no_overlap() {
        let text = "a".repeat(300);
        let chunks = chunk_text("doc", &text, 100, 0);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].position, 2);
        assert_eq!(chunks[1].metadata["start"], 100);
    }

    #[test]
    fn test_chunk_text_with_overlap() {
        let text = "a".repeat(1000);
        let chunks = chunk_text("doc", &text, 200, 50);

        assert_eq!(chunks[0].metadata["end"], 200);
        assert_eq!(chunks[1].metadata["start"], 150);
        assert_eq!(chunks.last().unwrap().metadata["end"], 1000);
    }

    #[test]
    fn test_short_text_is_one_passage() {
        let chunks = chunk_text("doc", "A tiny note.", 1000, 150);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "A tiny note.");
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("doc", "", 100, 10).is_empty());
        assert!(chunk_text("doc", "   \n  ", 100, 10).is_empty());
    }

    #[test]
    fn test_cuts_at_whitespace() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = chunk_text("doc", text, 20, 0);

        for chunk in &chunks {
            assert!(!chunk.text.starts_with(' '));
            assert!(text.contains(&chunk.text));
        }
        assert_eq!(chunks[0].text, "alpha beta gamma");
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let text = "é".repeat(500);
        let chunks = chunk_text("doc", &text, 101, 15);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().all(|ch| ch == 'é')));
    }
}
