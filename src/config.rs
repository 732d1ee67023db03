//! Configuration for the question-answering pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Configuration parameters for the question-answering pipeline.
///
/// The defaults match the documented behavior: 800-word chunks with a
/// 100-word overlap, a strict 0.3 relevance threshold, top-5 retrieval,
/// and embedding/storage batches of 50 and 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Target chunk size in whitespace-split words. Chunks may overshoot
    /// by up to one sentence to avoid splitting mid-sentence.
    pub target_chunk_size: usize,
    /// Number of trailing words from a chunk repeated at the start of
    /// the next chunk within the same page section.
    pub overlap_size: usize,
    /// Chunks at or below this word count are discarded as noise.
    pub min_chunk_words: usize,
    /// Sentences longer than this are halved at the midpoint word
    /// boundary before accumulation.
    pub max_sentence_words: usize,
    /// Number of nearest records to fetch per query.
    pub top_k: usize,
    /// Results with similarity at or below this value are discarded.
    pub similarity_threshold: f32,
    /// Number of chunks embedded per batch during ingestion.
    pub embed_batch_size: usize,
    /// Number of records written to the index per batch.
    pub store_batch_size: usize,
    /// Documents whose extracted text exceeds this many bytes are
    /// rejected per-document.
    pub max_document_bytes: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            target_chunk_size: 800,
            overlap_size: 100,
            min_chunk_words: 10,
            max_sentence_words: 500,
            top_k: 5,
            similarity_threshold: 0.3,
            embed_batch_size: 50,
            store_batch_size: 100,
            max_document_bytes: 50 * 1024 * 1024,
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the target chunk size in words.
    pub fn target_chunk_size(mut self, words: usize) -> Self {
        self.config.target_chunk_size = words;
        self
    }

    /// Set the overlap between consecutive chunks in words.
    pub fn overlap_size(mut self, words: usize) -> Self {
        self.config.overlap_size = words;
        self
    }

    /// Set the minimum word count below which chunks are discarded.
    pub fn min_chunk_words(mut self, words: usize) -> Self {
        self.config.min_chunk_words = words;
        self
    }

    /// Set the word count above which a sentence is halved.
    pub fn max_sentence_words(mut self, words: usize) -> Self {
        self.config.max_sentence_words = words;
        self
    }

    /// Set the number of nearest records fetched per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity a result must strictly exceed.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the embedding batch size.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Set the storage batch size.
    pub fn store_batch_size(mut self, size: usize) -> Self {
        self.config.store_batch_size = size;
        self
    }

    /// Set the maximum accepted extracted-text size in bytes.
    pub fn max_document_bytes(mut self, bytes: usize) -> Self {
        self.config.max_document_bytes = bytes;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if:
    /// - `overlap_size >= target_chunk_size`
    /// - `min_chunk_words >= target_chunk_size`
    /// - `max_sentence_words == 0`
    /// - `top_k == 0`
    /// - `similarity_threshold` is outside `[0.0, 1.0)`
    /// - either batch size is zero
    pub fn build(self) -> Result<QaConfig> {
        let c = &self.config;
        if c.overlap_size >= c.target_chunk_size {
            return Err(QaError::Config(format!(
                "overlap_size ({}) must be less than target_chunk_size ({})",
                c.overlap_size, c.target_chunk_size
            )));
        }
        if c.min_chunk_words >= c.target_chunk_size {
            return Err(QaError::Config(format!(
                "min_chunk_words ({}) must be less than target_chunk_size ({})",
                c.min_chunk_words, c.target_chunk_size
            )));
        }
        if c.max_sentence_words == 0 {
            return Err(QaError::Config("max_sentence_words must be greater than zero".to_string()));
        }
        if c.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if !(0.0..1.0).contains(&c.similarity_threshold) {
            return Err(QaError::Config(format!(
                "similarity_threshold ({}) must be in [0.0, 1.0)",
                c.similarity_threshold
            )));
        }
        if c.embed_batch_size == 0 || c.store_batch_size == 0 {
            return Err(QaError::Config("batch sizes must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = QaConfig::builder().build().unwrap();
        assert_eq!(config, QaConfig::default());
    }

    #[test]
    fn rejects_overlap_at_least_chunk_size() {
        let result = QaConfig::builder().target_chunk_size(100).overlap_size(100).build();
        assert!(matches!(result, Err(QaError::Config(_))));
    }

    #[test]
    fn rejects_zero_top_k() {
        let result = QaConfig::builder().top_k(0).build();
        assert!(matches!(result, Err(QaError::Config(_))));
    }

    #[test]
    fn rejects_threshold_of_one_or_more() {
        let result = QaConfig::builder().similarity_threshold(1.0).build();
        assert!(matches!(result, Err(QaError::Config(_))));
    }

    #[test]
    fn rejects_zero_batch_sizes() {
        let result = QaConfig::builder().store_batch_size(0).build();
        assert!(matches!(result, Err(QaError::Config(_))));
    }
}
