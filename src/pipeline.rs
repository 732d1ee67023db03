//! Question-answering pipeline orchestrator.
//!
//! [`QaPipeline`] coordinates the full ingest-and-answer workflow by
//! composing an [`Embedder`], a [`VectorIndex`], and an
//! [`AnswerSynthesizer`]. Ingestion runs normalize → chunk → embed →
//! store; answering runs embed → query → filter → cite → synthesize.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use doc_qa::{QaPipeline, QaConfig, InMemoryIndex, SourceDocument};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .vector_index(Arc::new(InMemoryIndex::new()))
//!     .synthesizer(Arc::new(my_synthesizer))
//!     .build()?;
//!
//! pipeline.create_index("kb").await?;
//! let report = pipeline.ingest("kb", &documents).await?;
//! let answer = pipeline.answer("kb", "What does the report conclude?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunking;
use crate::citation;
use crate::config::QaConfig;
use crate::document::{
    Answer, Chunk, DocumentFailure, IndexedRecord, IngestReport, IngestedDocument,
    RetrievedChunk, SourceDocument,
};
use crate::embedding::Embedder;
use crate::error::{QaError, Result};
use crate::normalize;
use crate::retriever;
use crate::synthesis::{AnswerSynthesizer, FALLBACK_ANSWER, SYNTHESIS_INSTRUCTIONS};
use crate::vectorstore::VectorIndex;

/// The question-answering pipeline orchestrator.
///
/// Stateless between calls: the only persistent state is the
/// externally-owned vector index, addressed by name on every call.
/// Construct one via [`QaPipeline::builder()`].
pub struct QaPipeline {
    config: QaConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Return a reference to the embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Return a reference to the vector index.
    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Create a named index sized for the configured embedder.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Index`] if the backend operation fails.
    pub async fn create_index(&self, name: &str) -> Result<()> {
        self.index.create_index(name, self.embedder.dimensions()).await.map_err(|e| {
            error!(index = name, error = %e, "failed to create index");
            e
        })
    }

    /// Drop all records from a named index and recreate it empty.
    ///
    /// Ingestion accumulates across runs; this is the only way the
    /// pipeline replaces index contents.
    pub async fn clear_index(&self, name: &str) -> Result<()> {
        self.index.delete_index(name).await?;
        self.index.create_index(name, self.embedder.dimensions()).await
    }

    /// Ingest documents: validate → normalize → chunk → embed → store.
    ///
    /// Per-document failures (validation, empty content, no chunks) are
    /// logged, recorded in the report, and skipped; sibling documents
    /// continue. Chunks from a skipped document never reach the index.
    /// Embedding runs in batches of `embed_batch_size` chunks and
    /// storage in batches of `store_batch_size` records, strictly in
    /// sequence, purely to bound memory and write size.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Ingestion`] if no documents were provided, if
    /// zero documents survive processing, or if embedding or a storage
    /// batch fails. An interrupted run may leave any prefix of completed
    /// storage batches visible in the index.
    pub async fn ingest(
        &self,
        index: &str,
        documents: &[SourceDocument],
    ) -> Result<IngestReport> {
        if documents.is_empty() {
            return Err(QaError::Ingestion("no documents provided".to_string()));
        }

        let mut pending: Vec<Chunk> = Vec::new();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for document in documents {
            let document_id = Uuid::new_v4().to_string();
            match self.prepare_document(document, &document_id) {
                Ok(chunks) => {
                    succeeded.push(IngestedDocument {
                        name: document.name.clone(),
                        document_id,
                        chunk_count: chunks.len(),
                    });
                    pending.extend(chunks);
                }
                Err(e) => {
                    warn!(document = %document.name, error = %e, "skipping document");
                    failed.push(DocumentFailure {
                        name: document.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if succeeded.is_empty() {
            return Err(QaError::Ingestion(format!(
                "no documents were successfully processed ({} skipped)",
                failed.len()
            )));
        }

        let records = self.embed_chunks(pending).await?;
        self.store_records(index, &records).await?;

        let report = IngestReport { succeeded, failed, chunks_indexed: records.len() };
        info!(
            index,
            processed = report.succeeded.len(),
            skipped = report.failed.len(),
            chunks = report.chunks_indexed,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Validate, normalize, and chunk a single document.
    fn prepare_document(
        &self,
        document: &SourceDocument,
        document_id: &str,
    ) -> Result<Vec<Chunk>> {
        if document.text.len() > self.config.max_document_bytes {
            return Err(QaError::Validation {
                document: document.name.clone(),
                message: format!(
                    "extracted text is {} bytes; maximum is {}",
                    document.text.len(),
                    self.config.max_document_bytes
                ),
            });
        }
        let normalized = normalize::normalize(&document.text, &document.name)?;
        chunking::chunk_document(&normalized, &document.name, document_id, &self.config)
    }

    /// Embed chunks in batches and assign each a fresh record id.
    async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<IndexedRecord>> {
        let mut records = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
                error!(error = %e, "embedding failed during ingestion");
                QaError::Ingestion(format!("embedding failed: {e}"))
            })?;
            for (chunk, embedding) in batch.iter().zip(embeddings) {
                records.push(IndexedRecord {
                    id: Uuid::new_v4().to_string(),
                    embedding,
                    text: chunk.text.clone(),
                    metadata: chunk.metadata.clone(),
                });
            }
        }
        Ok(records)
    }

    /// Write records to the index in batches.
    async fn store_records(&self, index: &str, records: &[IndexedRecord]) -> Result<()> {
        for batch in records.chunks(self.config.store_batch_size) {
            self.index.upsert(index, batch).await.map_err(|e| {
                error!(index, batch_len = batch.len(), error = %e, "storage batch failed");
                QaError::Ingestion(format!("storage batch failed: {e}"))
            })?;
        }
        Ok(())
    }

    /// Retrieve the chunks most relevant to a question.
    ///
    /// Embeds the question, queries the index for the `top_k` nearest
    /// records, and keeps those whose similarity strictly exceeds the
    /// configured threshold, nearest first. An empty result is a valid
    /// "no confident matches" outcome.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Query`] if embedding or the index query fails.
    /// Index state is unaffected either way.
    pub async fn retrieve(&self, index: &str, question: &str) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(question).await.map_err(|e| {
            error!(error = %e, "question embedding failed");
            QaError::Query(format!("question embedding failed: {e}"))
        })?;

        let matches =
            self.index.query(index, &query_embedding, self.config.top_k).await.map_err(|e| {
                error!(index, error = %e, "vector index query failed");
                QaError::Query(format!("index query failed in '{index}': {e}"))
            })?;

        Ok(retriever::filter_by_relevance(matches, self.config.similarity_threshold))
    }

    /// Answer a question from the indexed documents.
    ///
    /// If no chunk clears the relevance threshold, returns the fixed
    /// fallback answer with an empty citation list without invoking the
    /// synthesizer.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Query`] if retrieval or synthesis fails.
    pub async fn answer(&self, index: &str, question: &str) -> Result<Answer> {
        let retrieved = self.retrieve(index, question).await?;

        if retrieved.is_empty() {
            info!(index, "no chunks cleared the relevance threshold");
            return Ok(Answer { text: FALLBACK_ANSWER.to_string(), citations: Vec::new() });
        }

        let context = citation::build_context(&retrieved);
        let citations = citation::format_citations(&retrieved);

        let text = self
            .synthesizer
            .synthesize(question, &context, SYNTHESIS_INSTRUCTIONS)
            .await
            .map_err(|e| {
                error!(error = %e, "answer synthesis failed");
                QaError::Query(format!("answer synthesis failed: {e}"))
            })?;

        info!(index, sources = citations.len(), "answered question");
        Ok(Answer { text, citations })
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// All fields are required except `config`, which defaults to
/// [`QaConfig::default()`].
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if the embedder, vector index, or
    /// synthesizer is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| QaError::Config("embedder is required".to_string()))?;
        let index = self
            .index
            .ok_or_else(|| QaError::Config("vector_index is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| QaError::Config("synthesizer is required".to_string()))?;

        Ok(QaPipeline {
            config: self.config.unwrap_or_default(),
            embedder,
            index,
            synthesizer,
        })
    }
}
