//! Error types for the `doc-qa` crate.

use thiserror::Error;

/// Errors that can occur while ingesting documents or answering questions.
///
/// The `Validation`, `EmptyContent`, and `NoChunksProduced` variants are
/// per-document: during ingestion they cause that document to be skipped
/// and recorded in the [`IngestReport`](crate::document::IngestReport)
/// rather than aborting the run. All other variants are fatal to the
/// call that produced them.
#[derive(Debug, Error)]
pub enum QaError {
    /// An input document was rejected before processing.
    #[error("Invalid document '{document}': {message}")]
    Validation {
        /// The name of the rejected document.
        document: String,
        /// A description of why it was rejected.
        message: String,
    },

    /// Text extraction yielded no usable content for a document.
    #[error("No usable text in document '{document}'")]
    EmptyContent {
        /// The name of the document with no usable text.
        document: String,
    },

    /// Chunking produced zero chunks for a document.
    #[error("No chunks produced from document '{document}'")]
    NoChunksProduced {
        /// The name of the document that yielded no chunks.
        document: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    Index {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during answer synthesis.
    #[error("Synthesis error ({provider}): {message}")]
    Synthesis {
        /// The synthesis provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An ingestion run failed as a whole: zero documents survived
    /// processing, or a storage batch could not be written.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Answering a single question failed. Index state is unaffected.
    #[error("Query error: {0}")]
    Query(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for question-answering operations.
pub type Result<T> = std::result::Result<T, QaError>;
