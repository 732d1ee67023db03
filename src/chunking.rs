//! Sentence-boundary chunking with word-count overlap.
//!
//! Converts normalized, page-segmented text into an ordered sequence of
//! [`Chunk`]s:
//!
//! 1. Split on page markers into sections; sections are chunked
//!    independently so sentences never merge across pages.
//! 2. Split each section into sentences at `.`, `!`, or `?` followed by
//!    whitespace. This is a heuristic splitter, not grammar-aware; it
//!    may over-split on abbreviations.
//! 3. Feed sentences through a work queue. A sentence longer than
//!    `max_sentence_words` is halved at the midpoint word boundary and
//!    both halves are pushed back for reprocessing.
//! 4. Greedily accumulate sentences until appending the next one would
//!    exceed `target_chunk_size`, then emit the chunk and seed the next
//!    buffer with the trailing `overlap_size` words to preserve
//!    cross-chunk context.
//! 5. Discard any chunk at or below `min_chunk_words` as noise.
//!
//! Word counts are whitespace-split token counts throughout, not formal
//! tokenization.

use std::collections::VecDeque;

use chrono::Utc;

use crate::config::QaConfig;
use crate::document::{Chunk, ChunkMetadata, ChunkType};
use crate::error::{QaError, Result};
use crate::normalize;

/// Split a normalized document body into an ordered sequence of chunks.
///
/// `source` is the document's display name (recorded in metadata for
/// citations) and `document_id` the synthetic id assigned for this
/// ingestion run.
///
/// # Errors
///
/// Returns [`QaError::NoChunksProduced`] if no section yields a chunk
/// above the minimum word count.
pub fn chunk_document(
    normalized: &str,
    source: &str,
    document_id: &str,
    config: &QaConfig,
) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();

    for section in normalize::split_pages(normalized) {
        if section.trim().is_empty() {
            continue;
        }
        chunk_section(section, source, document_id, config, &mut chunks);
    }

    if chunks.is_empty() {
        return Err(QaError::NoChunksProduced { document: source.to_string() });
    }
    Ok(chunks)
}

/// Chunk a single page section.
fn chunk_section(
    section: &str,
    source: &str,
    document_id: &str,
    config: &QaConfig,
    out: &mut Vec<Chunk>,
) {
    let mut queue: VecDeque<String> =
        split_sentences(section).into_iter().map(str::to_string).collect();

    let mut buffer = String::new();
    let mut buffer_words = 0usize;

    while let Some(sentence) = queue.pop_front() {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        let word_count = count_words(sentence);
        if word_count > config.max_sentence_words {
            let (head, tail) = halve_at_word_boundary(sentence);
            queue.push_front(tail);
            queue.push_front(head);
            continue;
        }

        if buffer_words + word_count > config.target_chunk_size && !buffer.is_empty() {
            emit_chunk(out, &buffer, buffer_words, source, document_id, config.min_chunk_words);

            let seed = tail_words(&buffer, config.overlap_size).join(" ");
            let seed_words = count_words(&seed);
            buffer = format!("{seed} {sentence}");
            buffer_words = seed_words + word_count;
        } else if buffer.is_empty() {
            // An oversized remainder is accepted as-is; halving in the
            // queue already bounded it.
            buffer = sentence.to_string();
            buffer_words = word_count;
        } else {
            buffer.push(' ');
            buffer.push_str(sentence);
            buffer_words += word_count;
        }
    }

    emit_chunk(out, &buffer, buffer_words, source, document_id, config.min_chunk_words);
}

/// Emit a chunk unless it falls at or below the minimum word count.
fn emit_chunk(
    out: &mut Vec<Chunk>,
    text: &str,
    word_count: usize,
    source: &str,
    document_id: &str,
    min_chunk_words: usize,
) {
    if word_count <= min_chunk_words {
        return;
    }
    out.push(Chunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source: source.to_string(),
            document_id: document_id.to_string(),
            chunk_type: ChunkType::Text,
            word_count,
            timestamp: Utc::now(),
            similarity_score: None,
        },
    });
}

/// Split text into sentences at `.`, `!`, or `?` followed by whitespace.
///
/// The terminator stays with its sentence; the following whitespace is
/// trimmed from the start of the next sentence by the caller.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_start, next)) = chars.peek() {
                if next.is_whitespace() {
                    sentences.push(&text[start..next_start]);
                    start = next_start;
                }
            }
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Halve a sentence at the midpoint word boundary.
fn halve_at_word_boundary(sentence: &str) -> (String, String) {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let mid = words.len() / 2;
    (words[..mid].join(" "), words[mid..].join(" "))
}

/// The trailing `n` whitespace-split words of a text.
fn tail_words(text: &str, n: usize) -> Vec<&str> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(n);
    words[start..].to_vec()
}

/// Whitespace-split token count.
fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    /// `count` sentences of exactly ten words each.
    fn ten_word_sentences(count: usize) -> String {
        (0..count)
            .map(|i| format!("Sentence {i} contains exactly ten whitespace split words right here."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn short_document_yields_single_chunk_equal_to_input() {
        let config = QaConfig::default();
        let normalized = normalize(&ten_word_sentences(5), "doc.txt").unwrap();
        let chunks = chunk_document(&normalized, "doc.txt", "id-1", &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, normalized);
        assert_eq!(chunks[0].metadata.word_count, 50);
        assert_eq!(chunks[0].metadata.source, "doc.txt");
        assert_eq!(chunks[0].metadata.document_id, "id-1");
    }

    #[test]
    fn two_thousand_words_yield_three_overlapping_chunks() {
        let config = QaConfig::default();
        let text = ten_word_sentences(200);
        let chunks = chunk_document(&text, "doc.txt", "id-1", &config).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].metadata.word_count, 800);
        assert_eq!(chunks[1].metadata.word_count, 800);
        assert_eq!(chunks[2].metadata.word_count, 600);

        for pair in chunks.windows(2) {
            let prev = words(&pair[0].text);
            let next = words(&pair[1].text);
            let tail = &prev[prev.len() - config.overlap_size..];
            assert_eq!(&next[..config.overlap_size], tail, "overlap prefix mismatch");
        }
    }

    #[test]
    fn every_chunk_exceeds_minimum_word_count() {
        let config = QaConfig::default();
        let chunks = chunk_document(&ten_word_sentences(150), "doc.txt", "id-1", &config).unwrap();
        for chunk in &chunks {
            assert!(chunk.metadata.word_count > config.min_chunk_words);
            assert!(!chunk.text.trim().is_empty());
            assert_eq!(chunk.metadata.word_count, words(&chunk.text).len());
        }
    }

    #[test]
    fn giant_sentence_is_halved_through_the_work_queue() {
        let config = QaConfig::default();
        // 1200 words, no sentence terminators at all.
        let text = (0..1200).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_document(&text, "doc.txt", "id-1", &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.word_count, 600);
        assert_eq!(chunks[1].metadata.word_count, 700);
        // No words lost: the second chunk repeats the 100-word overlap.
        let unique: usize = 600 + 700 - config.overlap_size;
        assert_eq!(unique, 1200);
    }

    #[test]
    fn duplicate_sentences_survive_splitting() {
        let config = QaConfig::builder()
            .target_chunk_size(30)
            .overlap_size(5)
            .min_chunk_words(3)
            .build()
            .unwrap();
        let sentence = "The same repeated sentence appears many times in this document body.";
        let text = vec![sentence; 8].join(" ");
        let chunks = chunk_document(&text, "doc.txt", "id-1", &config).unwrap();

        assert!(chunks.len() > 1);
        let total_occurrences: usize =
            chunks.iter().map(|c| c.text.matches("The same repeated").count()).sum();
        // Overlap may duplicate boundary sentences, never drop them.
        assert!(total_occurrences >= 8);
    }

    #[test]
    fn sections_are_chunked_independently() {
        let config = QaConfig::default();
        let text = format!(
            "{}\n--- Page 2 ---\n{}",
            ten_word_sentences(3),
            ten_word_sentences(4)
        );
        let chunks = chunk_document(&text, "doc.txt", "id-1", &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.word_count, 30);
        assert_eq!(chunks[1].metadata.word_count, 40);
        // The second section's chunk carries no overlap from the first.
        assert!(chunks[1].text.starts_with("Sentence 0"));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let config = QaConfig::default();
        let text = format!("   \n--- Page 2 ---\n{}", ten_word_sentences(3));
        let chunks = chunk_document(&text, "doc.txt", "id-1", &config).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn too_short_document_produces_no_chunks_error() {
        let config = QaConfig::default();
        let err = chunk_document("Five words are not enough.", "tiny.txt", "id-1", &config)
            .unwrap_err();
        assert!(matches!(err, QaError::NoChunksProduced { document } if document == "tiny.txt"));
    }

    #[test]
    fn sentence_splitter_keeps_terminators() {
        let sentences = split_sentences("One here. Two there! Three now? Four");
        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences[0], "One here.");
        assert_eq!(sentences[1].trim(), "Two there!");
        assert_eq!(sentences[2].trim(), "Three now?");
        assert_eq!(sentences[3].trim(), "Four");
    }

    #[test]
    fn decimal_points_do_not_split_sentences() {
        let sentences = split_sentences("The value is 3.14 exactly. Next sentence.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "The value is 3.14 exactly.");
    }
}
