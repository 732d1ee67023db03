//! Relevance filtering for raw nearest-neighbor matches.
//!
//! Converts cosine distances to similarity scores (`1 − distance`),
//! strictly discards anything at or below the relevance threshold, and
//! attaches the rounded score to each survivor's metadata. Ranking
//! order is preserved from the store's nearest-first output.

use crate::document::{QueryMatch, RetrievedChunk};

/// Filter raw matches by the relevance threshold.
///
/// A result survives only if `1 − distance` strictly exceeds
/// `threshold`; filtering uses the unrounded score, and the 3-decimal
/// rounded value is what gets stored in `metadata.similarity_score`.
/// An empty return is a valid outcome (no confident matches), not an
/// error.
pub fn filter_by_relevance(matches: Vec<QueryMatch>, threshold: f32) -> Vec<RetrievedChunk> {
    matches
        .into_iter()
        .filter_map(|m| {
            let similarity = 1.0 - m.distance;
            if similarity > threshold {
                let mut metadata = m.metadata;
                metadata.similarity_score = Some(round3(similarity));
                Some(RetrievedChunk { text: m.text, metadata })
            } else {
                None
            }
        })
        .collect()
}

/// Round to three decimal places for display and citation.
fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::document::{ChunkMetadata, ChunkType};

    fn query_match(text: &str, distance: f32) -> QueryMatch {
        QueryMatch {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source: "doc.txt".to_string(),
                document_id: "d1".to_string(),
                chunk_type: ChunkType::Text,
                word_count: 42,
                timestamp: Utc::now(),
                similarity_score: None,
            },
            distance,
        }
    }

    #[test]
    fn discards_at_and_below_threshold() {
        let matches = vec![
            query_match("strong", 0.1),   // similarity 0.9
            query_match("edge", 0.7),     // similarity 0.3 exactly — discarded
            query_match("weak", 0.71),    // similarity 0.29
            query_match("negative", 1.2), // similarity -0.2
        ];
        let retrieved = filter_by_relevance(matches, 0.3);
        assert_eq!(retrieved.len(), 1);
        assert_eq!(retrieved[0].text, "strong");
        assert_eq!(retrieved[0].metadata.similarity_score, Some(0.9));
    }

    #[test]
    fn preserves_nearest_first_order() {
        let matches = vec![
            query_match("first", 0.05),
            query_match("second", 0.2),
            query_match("third", 0.4),
        ];
        let retrieved = filter_by_relevance(matches, 0.3);
        let texts: Vec<&str> = retrieved.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn scores_are_rounded_to_three_decimals() {
        let retrieved = filter_by_relevance(vec![query_match("a", 0.5433)], 0.3);
        assert_eq!(retrieved[0].metadata.similarity_score, Some(0.457));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_by_relevance(Vec::new(), 0.3).is_empty());
    }
}
