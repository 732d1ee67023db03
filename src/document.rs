//! Data types for documents, chunks, indexed records, and answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded document after external text extraction.
///
/// The pipeline receives extracted text only; file parsing and encoding
/// detection happen upstream. `name` is the display identifier used in
/// citations (typically the uploaded filename) and is not guaranteed
/// unique — a synthetic `document_id` is assigned at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// Display name used in citations.
    pub name: String,
    /// Extracted text, possibly containing page-boundary markers.
    pub text: String,
}

impl SourceDocument {
    /// Create a new source document.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

/// The kind of content a chunk holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// Plain document text.
    Text,
}

/// The fixed metadata record attached to every chunk.
///
/// The field set is small and stable, so this is a struct rather than a
/// loosely-typed map. `similarity_score` is `None` until retrieval
/// attaches a rounded score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Name of the originating document.
    pub source: String,
    /// Synthetic per-ingestion document identifier.
    pub document_id: String,
    /// The kind of content in the chunk.
    pub chunk_type: ChunkType,
    /// Whitespace-split token count of the chunk text.
    pub word_count: usize,
    /// When the chunk was created.
    pub timestamp: DateTime<Utc>,
    /// Rounded similarity score, set on retrieved chunks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

/// A bounded span of normalized document text.
///
/// Invariants: `metadata.word_count > min_chunk_words`; the text is never
/// empty or whitespace-only; each chunk after the first within a page
/// section begins with the trailing overlap words of its predecessor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// The chunk's metadata record.
    pub metadata: ChunkMetadata,
}

/// A stored (id, embedding, text, metadata) tuple.
///
/// Ids are freshly generated per chunk and never derived from content.
/// Records are append-only: the pipeline never mutates a record after
/// insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedRecord {
    /// Unique identifier for the record.
    pub id: String,
    /// The embedding vector for the chunk text.
    pub embedding: Vec<f32>,
    /// The chunk text.
    pub text: String,
    /// The chunk's metadata record.
    pub metadata: ChunkMetadata,
}

/// A raw nearest-neighbor match in cosine-distance space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// The matched chunk text.
    pub text: String,
    /// The matched chunk's metadata.
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query embedding (lower is closer).
    pub distance: f32,
}

/// A retrieval result that cleared the relevance threshold.
///
/// `metadata.similarity_score` is always `Some` on a retrieved chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The retrieved chunk text.
    pub text: String,
    /// The chunk's metadata with the similarity score attached.
    pub metadata: ChunkMetadata,
}

/// A synthesized answer with its deduplicated citation lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The answer text (or the fixed fallback message when retrieval
    /// found no confident matches).
    pub text: String,
    /// Formatted citations, order-preserving and deduplicated.
    pub citations: Vec<String>,
}

/// One successfully ingested document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestedDocument {
    /// The document's display name.
    pub name: String,
    /// The synthetic id assigned during this ingestion run.
    pub document_id: String,
    /// Number of chunks produced from the document.
    pub chunk_count: usize,
}

/// One document that was skipped during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentFailure {
    /// The document's display name.
    pub name: String,
    /// Why the document was skipped.
    pub reason: String,
}

/// The outcome of an ingestion run.
///
/// An ingestion run succeeds if at least one document was fully
/// processed; `failed` records the documents that were skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    /// Documents that were chunked and indexed.
    pub succeeded: Vec<IngestedDocument>,
    /// Documents that were skipped, with reasons.
    pub failed: Vec<DocumentFailure>,
    /// Total number of records written to the index.
    pub chunks_indexed: usize,
}

impl IngestReport {
    /// Total number of documents the run attempted to process.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
