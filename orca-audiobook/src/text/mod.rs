//! Text processing module for TTS: normalization, sentence splitting and chunking.

pub mod chunker;
mod normalizer;
mod sentences;

pub use chunker::chunk_text;
pub use normalizer::normalize;

/// What a chunk contributes to the audiobook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Narrated chapter text
    Body,
    /// Announcement closing a chapter
    ChapterMarker,
}

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the whole run, starting at 1; the assembly order
    pub global_index: usize,
    /// The chapter this chunk belongs to, starting at 1
    pub chapter_index: usize,
    /// Body text or chapter marker
    pub kind: ChunkKind,
    /// The text content
    pub content: String,
}

impl TextChunk {
    /// Create a new body chunk.
    pub fn body(global_index: usize, chapter_index: usize, content: String) -> Self {
        Self {
            global_index,
            chapter_index,
            kind: ChunkKind::Body,
            content,
        }
    }

    /// Create a new chapter-end marker chunk.
    pub fn marker(global_index: usize, chapter_index: usize, content: String) -> Self {
        Self {
            global_index,
            chapter_index,
            kind: ChunkKind::ChapterMarker,
            content,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.kind == ChunkKind::ChapterMarker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::Language;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::body(4, 1, "Hello world".to_string());
        assert_eq!(chunk.global_index, 4);
        assert_eq!(chunk.chapter_index, 1);
        assert_eq!(chunk.kind, ChunkKind::Body);
        assert!(!chunk.is_marker());
    }

    #[test]
    fn test_marker_chunk() {
        let chunk = TextChunk::marker(5, 1, "End of chapter 1.".to_string());
        assert!(chunk.is_marker());
    }

    #[test]
    fn test_quoted_dialogue_splits_at_sentence_end() {
        let normalized = normalize(
            "He left.\"Then she spoke at length about things.",
            Language::En,
        );
        assert_eq!(
            chunk_text(&normalized, 20),
            vec!["He left.", "\"Then she spoke at", "length about things."]
        );
    }
}
