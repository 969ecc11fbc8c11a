//! Sentence splitting on terminal punctuation.

/// Characters that end a sentence when followed by whitespace.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// Sentences are trimmed; empty ones are dropped. Text without terminal
/// punctuation comes back as a single sentence.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !TERMINATORS.contains(&c) {
            continue;
        }
        if let Some(&(next, following)) = chars.peek() {
            if following.is_whitespace() {
                push_sentence(&mut sentences, &text[start..next]);
                start = next;
            }
        }
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
