//! Property tests for in-memory index query ordering.

use std::collections::HashMap;

use chrono::Utc;
use doc_qa::document::{ChunkMetadata, ChunkType, IndexedRecord};
use doc_qa::inmemory::InMemoryIndex;
use doc_qa::vectorstore::VectorIndex;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a record with a normalized embedding.
fn arb_record(dim: usize) -> impl Strategy<Value = IndexedRecord> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| IndexedRecord {
            id,
            text,
            embedding,
            metadata: ChunkMetadata {
                source: "doc.txt".to_string(),
                document_id: "d1".to_string(),
                chunk_type: ChunkType::Text,
                word_count: 42,
                timestamp: Utc::now(),
                similarity_score: None,
            },
        },
    )
}

/// For any set of stored records, querying returns matches ordered by
/// ascending cosine distance (nearest first), bounded by `top_k`, with
/// every distance in the valid cosine range `[0, 2]`.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn matches_ascend_by_distance_and_respect_top_k(
            records in proptest::collection::vec(arb_record(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (matches, unique_count) = rt.block_on(async {
                let store = InMemoryIndex::new();
                store.create_index("test", DIM).await.unwrap();

                // Deduplicate by id so upsert overwrites don't skew counts
                let mut deduped: HashMap<String, IndexedRecord> = HashMap::new();
                for record in &records {
                    deduped.entry(record.id.clone()).or_insert_with(|| record.clone());
                }
                let unique: Vec<IndexedRecord> = deduped.into_values().collect();
                let count = unique.len();

                store.upsert("test", &unique).await.unwrap();
                let matches = store.query("test", &query, top_k).await.unwrap();
                (matches, count)
            });

            prop_assert!(matches.len() <= top_k);
            prop_assert!(matches.len() <= unique_count);

            for window in matches.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "matches not in ascending distance order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }

            for m in &matches {
                prop_assert!((-1e-5..=2.0 + 1e-5).contains(&(m.distance as f64)));
            }
        }
    }
}
