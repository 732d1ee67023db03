//! Context-block assembly and citation formatting.
//!
//! Turns filtered retrieval results into (a) the context block handed
//! to answer synthesis and (b) the human-facing citation list. Both
//! preserve retrieval order; citations are deduplicated by exact string
//! equality with the first occurrence winning.

use std::collections::HashSet;

use crate::document::RetrievedChunk;

/// Build the context block for answer synthesis.
///
/// Each chunk is prefixed with a `[Source: … | Relevance: …]` header
/// line; blocks are joined with a blank line, retrieval order preserved.
pub fn build_context(results: &[RetrievedChunk]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[Source: {} | Relevance: {}]\n{}",
                r.metadata.source,
                format_score(r.metadata.similarity_score),
                r.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format the citation list shown alongside the answer.
///
/// Two results with the same source and the same rounded score collapse
/// to a single citation line.
pub fn format_citations(results: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();
    for r in results {
        let line = format!(
            "{} (relevance: {})",
            r.metadata.source,
            format_score(r.metadata.similarity_score)
        );
        if seen.insert(line.clone()) {
            citations.push(line);
        }
    }
    citations
}

fn format_score(score: Option<f32>) -> String {
    match score {
        Some(s) => s.to_string(),
        None => "N/A".to_string(),
    }
}
