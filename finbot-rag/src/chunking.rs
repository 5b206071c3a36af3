//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! splits by character count with a configurable overlap between consecutive
//! chunks. Splitting is deterministic: the same text with the same parameters
//! always yields the same ordered sequence of chunks.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Offsets are counted in characters, not bytes, so multi-byte text never
/// splits inside a code point. Every chunk after the first starts
/// `chunk_size - chunk_overlap` characters after its predecessor, so
/// consecutive chunks share exactly `chunk_overlap` characters (the final
/// chunk may be shorter when the document ends).
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus a `chunk_index` field.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        // Byte offset of each character boundary, so slices stay valid UTF-8.
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total_chars = boundaries.len();

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let byte_start = boundaries[start];
            let byte_end = if end == total_chars { text.len() } else { boundaries[end] };
            let chunk_text = &text[byte_start..byte_end];

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                text: chunk_text.to_string(),
                embedding: Vec::new(),
                metadata,
                document_id: document.id.clone(),
            });

            chunk_index += 1;
            // The chunk reached the document end; a further chunk would only
            // repeat text already emitted.
            if end == total_chars {
                break;
            }
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("doc_1", text)
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(400, 50);
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let chunker = FixedSizeChunker::new(400, 50);
        let chunks = chunker.chunk(&doc("budgeting basics"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "budgeting basics");
        assert_eq!(chunks[0].id, "doc_1_0");
        assert_eq!(chunks[0].metadata["chunk_index"], "0");
    }

    #[test]
    fn splitting_is_deterministic() {
        let chunker = FixedSizeChunker::new(10, 3);
        let text = "a".repeat(25) + &"b".repeat(25);
        let first = chunker.chunk(&doc(&text));
        let second = chunker.chunk(&doc(&text));
        assert_eq!(first, second);
    }

    #[test]
    fn consecutive_chunks_overlap_by_configured_length() {
        let chunker = FixedSizeChunker::new(10, 4);
        let text: String = ('a'..='z').collect();
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            let tail: String = prev[prev.len() - 4..].iter().collect();
            let head: String = next[..4.min(next.len())].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn truncated_final_chunk_ends_the_sequence() {
        let chunker = FixedSizeChunker::new(10, 4);
        let text: String = ('a'..='z').collect();
        let chunks = chunker.chunk(&doc(&text));

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["abcdefghij", "ghijklmnop", "mnopqrstuv", "stuvwxyz"]);

        // No chunk repeats text already wholly covered by its predecessor.
        for pair in chunks.windows(2) {
            assert!(!pair[0].text.contains(&pair[1].text));
        }
    }

    #[test]
    fn final_chunk_truncates_at_document_end() {
        let chunker = FixedSizeChunker::new(10, 2);
        let chunks = chunker.chunk(&doc(&"x".repeat(21)));
        // Steps of 8 chars: starts at 0, 8, 16.
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text.chars().count(), 5);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let chunker = FixedSizeChunker::new(4, 1);
        let chunks = chunker.chunk(&doc("héllø wörld €100"));
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 4);
        }
        // Re-joining with the overlap removed reproduces the original text.
        let mut rebuilt: String = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.text.chars().skip(1));
        }
        assert_eq!(rebuilt, "héllø wörld €100");
    }

    #[test]
    fn overlap_equal_to_size_emits_one_chunk() {
        let chunker = FixedSizeChunker::new(5, 5);
        let chunks = chunker.chunk(&doc(&"y".repeat(50)));
        assert_eq!(chunks.len(), 1);
    }
}
