//! Retrieval-augmented question answering over uploaded documents.
//!
//! `doc-qa` turns extracted document text into an indexed knowledge
//! base and answers natural-language questions from it with cited
//! sources. The crate owns the text-chunking and retrieval pipeline:
//!
//! - [`normalize`] — whitespace cleanup that preserves page boundaries
//! - [`chunking`] — sentence-boundary chunks with word-count overlap
//! - [`pipeline`] — ingestion batching and the ingest/answer workflow
//! - [`retriever`] — similarity thresholding on nearest-neighbor hits
//! - [`citation`] — context blocks and deduplicated citation lists
//!
//! The embedding model, vector store, and answer-drafting model are
//! black boxes behind the [`Embedder`], [`VectorIndex`], and
//! [`AnswerSynthesizer`] traits. [`InMemoryIndex`] is the bundled
//! reference store; the `openai` feature adds API-backed providers.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use doc_qa::{InMemoryIndex, QaConfig, QaPipeline, SourceDocument};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryIndex::new()))
//!     .synthesizer(Arc::new(synthesizer))
//!     .build()?;
//!
//! pipeline.create_index("kb").await?;
//! let report = pipeline
//!     .ingest("kb", &[SourceDocument::new("notes.txt", text)])
//!     .await?;
//! println!("indexed {}/{} documents", report.succeeded.len(), report.total());
//!
//! let answer = pipeline.answer("kb", "What is the main finding?").await?;
//! println!("{}", answer.text);
//! for citation in &answer.citations {
//!     println!("  - {citation}");
//! }
//! ```

pub mod chunking;
pub mod citation;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod normalize;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod synthesis;
pub mod vectorstore;

pub use config::{QaConfig, QaConfigBuilder};
pub use document::{
    Answer, Chunk, ChunkMetadata, ChunkType, DocumentFailure, IndexedRecord, IngestReport,
    IngestedDocument, QueryMatch, RetrievedChunk, SourceDocument,
};
pub use embedding::Embedder;
pub use error::{QaError, Result};
pub use inmemory::InMemoryIndex;
pub use pipeline::{QaPipeline, QaPipelineBuilder};
pub use synthesis::{AnswerSynthesizer, FALLBACK_ANSWER, SYNTHESIS_INSTRUCTIONS};
pub use vectorstore::VectorIndex;
