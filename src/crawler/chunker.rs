//! Token-budgeted chunking of page text
//!
//! Pages are split on line boundaries so table rows stay intact. Token counts
//! are estimated from word counts; chunks do not overlap.

/// Average number of words per model token
const WORDS_PER_TOKEN: f64 = 0.75;

/// Estimates the token count of a piece of text
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words as f64 / WORDS_PER_TOKEN).ceil() as usize
}

/// Splits text into chunks of at most `token_threshold` estimated tokens
///
/// Lines are never split unless a single line exceeds the budget on its
/// own; such a line is cut on word boundaries.
pub fn chunk_text(text: &str, token_threshold: usize) -> Vec<String> {
    let max_words = ((token_threshold as f64) * WORDS_PER_TOKEN).floor().max(1.0) as usize;

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0;

    for line in text.lines() {
        let words = line.split_whitespace().count();

        if words > max_words {
            flush(&mut chunks, &mut current, &mut current_words);
            let all: Vec<&str> = line.split_whitespace().collect();
            for piece in all.chunks(max_words) {
                chunks.push(piece.join(" "));
            }
            continue;
        }

        if current_words + words > max_words {
            flush(&mut chunks, &mut current, &mut current_words);
        }

        current.push(line);
        current_words += words;
    }

    flush(&mut chunks, &mut current, &mut current_words);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut Vec<&str>, current_words: &mut usize) {
    let joined = current.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
    *current_words = 0;
}
