//! Vector index seam: the black-box nearest-neighbor store.

use async_trait::async_trait;

use crate::document::{IndexedRecord, QueryMatch};
use crate::error::Result;

/// A persistent store of embedded chunks, queryable by cosine distance.
///
/// Implementations manage named indexes of [`IndexedRecord`]s. Records
/// are append-only from the pipeline's point of view: repeated ingestion
/// runs accumulate until the caller clears the index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named index. No-op if it already exists.
    async fn create_index(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named index and all its records.
    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Insert records into an index. Records must have embeddings set.
    async fn upsert(&self, index: &str, records: &[IndexedRecord]) -> Result<()>;

    /// The `top_k` records nearest to `embedding` in cosine distance,
    /// nearest first.
    async fn query(&self, index: &str, embedding: &[f32], top_k: usize)
    -> Result<Vec<QueryMatch>>;
}
