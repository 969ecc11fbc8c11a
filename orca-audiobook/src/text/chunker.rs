//! Text chunking for TTS processing.

use super::sentences::split_into_sentences;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Split text into chunks of at most `max_length` characters.
///
/// Whole sentences are merged greedily. A sentence longer than the budget
/// is packed word by word instead. A single word longer than `max_length`
/// becomes a chunk of its own, the only case in which a chunk exceeds the
/// budget.
///
/// # Arguments
/// * `text` - Normalized text to chunk
/// * `max_length` - Maximum chunk size in characters
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    let mut chunker = Accumulator::new(max_length);

    for sentence in split_into_sentences(text) {
        if char_len(&sentence) <= max_length {
            chunker.push(&sentence);
        } else {
            chunker.flush();
            for word in sentence.split_whitespace() {
                chunker.push(word);
            }
        }
    }

    chunker.finish()
}

/// Greedy accumulator shared by the sentence and word passes.
struct Accumulator {
    max_length: usize,
    current: String,
    current_len: usize,
    chunks: Vec<String>,
}

impl Accumulator {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            current: String::new(),
            current_len: 0,
            chunks: Vec::new(),
        }
    }

    /// Add a sentence or word, flushing first if it does not fit.
    fn push(&mut self, piece: &str) {
        if !self.fits(piece) {
            self.flush();
        }
        self.append(piece);
    }

    /// Whether `piece` can join the current chunk with one separator.
    fn fits(&self, piece: &str) -> bool {
        self.current.is_empty() || self.current_len + 1 + char_len(piece) <= self.max_length
    }

    fn append(&mut self, piece: &str) {
        if !self.current.is_empty() {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(piece);
        self.current_len += char_len(piece);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chunk_short_text() {
        let chunks = chunk_text("Hello world. How are you?", 500);
        assert_eq!(chunks, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_chunk_splits_long_sentence_on_words() {
        let text =
            "Hi there. This sentence is definitely too long to fit in one chunk of size twenty.";
        let chunks = chunk_text(text, 20);
        assert_eq!(
            chunks,
            vec![
                "Hi there.",
                "This sentence is",
                "definitely too long",
                "to fit in one chunk",
                "of size twenty.",
            ]
        );
    }

    #[test]
    fn test_chunk_merges_sentences_up_to_budget() {
        let text = "First one. Second one. Third one.";
        let chunks = chunk_text(text, 22);
        assert_eq!(chunks, vec!["First one. Second one.", "Third one."]);
    }

    #[test]
    fn test_word_remainder_merges_with_next_sentence() {
        let text = "aaaa bbbb cccc. Ok.";
        let chunks = chunk_text(text, 10);
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc. Ok."]);
    }

    #[test]
    fn test_oversized_word_is_its_own_chunk() {
        let text = "tiny Pneumonoultramicroscopicsilicovolcanoconiosis word";
        let chunks = chunk_text(text, 10);
        assert_eq!(
            chunks,
            vec!["tiny", "Pneumonoultramicroscopicsilicovolcanoconiosis", "word"]
        );
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("", 500).is_empty());
        assert!(chunk_text("   ", 500).is_empty());
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let text = "Über Äpfel. Öl ist süß.";
        let chunks = chunk_text(text, 23);
        assert_eq!(chunks, vec!["Über Äpfel. Öl ist süß."]);
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_budget(
            text in "([a-z]{1,15}[ .!?]{1,2}){0,60}",
            max_length in 5usize..80,
        ) {
            for chunk in chunk_text(&text, max_length) {
                prop_assert!(!chunk.is_empty());
                let single_word = !chunk.contains(' ');
                prop_assert!(
                    chunk.chars().count() <= max_length || single_word,
                    "chunk {:?} exceeds {}", chunk, max_length
                );
            }
        }

        #[test]
        fn prop_chunks_preserve_order(
            text in "([a-zA-Z]{1,12}[ .!?,]{1,2}){0,60}",
            max_length in 5usize..80,
        ) {
            let joined = chunk_text(&text, max_length).join(" ");
            let expected: Vec<&str> = text.split_whitespace().collect();
            let actual: Vec<&str> = joined.split_whitespace().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
