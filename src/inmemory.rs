//! In-memory vector index using cosine distance.
//!
//! [`InMemoryIndex`] backs the [`VectorIndex`] trait with nested
//! `HashMap`s behind a `tokio::sync::RwLock`. It is the reference store
//! for development and testing; production deployments plug in an
//! external nearest-neighbor service through the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedRecord, QueryMatch};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorIndex;

/// An in-memory [`VectorIndex`] searching by cosine distance.
///
/// Indexes are stored as index name → record id → record. All
/// operations are async-safe via `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    indexes: RwLock<HashMap<String, HashMap<String, IndexedRecord>>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(name: &str) -> QaError {
        QaError::Index {
            backend: "InMemory".to_string(),
            message: format!("index '{name}' does not exist"),
        }
    }
}

/// Cosine distance between two vectors: `1 − cosine similarity`.
///
/// A zero-magnitude vector has no direction; its distance to anything
/// is 1.0 (similarity zero).
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn create_index(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.remove(name);
        Ok(())
    }

    async fn upsert(&self, index: &str, records: &[IndexedRecord]) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        let store = indexes.get_mut(index).ok_or_else(|| Self::missing(index))?;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        let indexes = self.indexes.read().await;
        let store = indexes.get(index).ok_or_else(|| Self::missing(index))?;

        let mut matches: Vec<QueryMatch> = store
            .values()
            .map(|record| QueryMatch {
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(&record.embedding, embedding),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::document::{ChunkMetadata, ChunkType};

    fn record(id: &str, embedding: Vec<f32>) -> IndexedRecord {
        IndexedRecord {
            id: id.to_string(),
            embedding,
            text: format!("text for {id}"),
            metadata: ChunkMetadata {
                source: "doc.txt".to_string(),
                document_id: "d1".to_string(),
                chunk_type: ChunkType::Text,
                word_count: 42,
                timestamp: Utc::now(),
                similarity_score: None,
            },
        }
    }

    #[tokio::test]
    async fn query_returns_nearest_first() {
        let store = InMemoryIndex::new();
        store.create_index("kb", 2).await.unwrap();
        store
            .upsert(
                "kb",
                &[
                    record("aligned", vec![1.0, 0.0]),
                    record("orthogonal", vec![0.0, 1.0]),
                    record("opposite", vec![-1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let matches = store.query("kb", &[1.0, 0.0], 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert!(matches[0].distance < 1e-6);
        assert!((matches[1].distance - 1.0).abs() < 1e-6);
        assert!((matches[2].distance - 2.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn query_truncates_to_top_k() {
        let store = InMemoryIndex::new();
        store.create_index("kb", 2).await.unwrap();
        let records: Vec<IndexedRecord> =
            (0..10).map(|i| record(&format!("r{i}"), vec![1.0, i as f32])).collect();
        store.upsert("kb", &records).await.unwrap();

        let matches = store.query("kb", &[1.0, 0.0], 4).await.unwrap();
        assert_eq!(matches.len(), 4);
    }

    #[tokio::test]
    async fn missing_index_is_an_error() {
        let store = InMemoryIndex::new();
        let err = store.query("nope", &[1.0], 1).await.unwrap_err();
        assert!(matches!(err, QaError::Index { .. }));
        let err = store.upsert("nope", &[]).await.unwrap_err();
        assert!(matches!(err, QaError::Index { .. }));
    }

    #[tokio::test]
    async fn zero_vector_has_unit_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
