//! Answer-synthesis seam: the black-box (question, context) → text call.

use async_trait::async_trait;

use crate::error::Result;

/// The structural instructions supplied with every synthesis call.
///
/// The pipeline owns these; prompt wording beyond them belongs to the
/// synthesis backend.
pub const SYNTHESIS_INSTRUCTIONS: &str = "\
1. Answer based ONLY on the provided context. Do not use external knowledge.
2. If the context doesn't contain enough information to fully answer, say so and indicate what information is missing.
3. Be specific and cite your sources using the source names provided.
4. If different sources conflict, acknowledge the conflict and present both viewpoints.
5. Keep the answer comprehensive but concise.";

/// The fixed answer returned when no chunk clears the relevance
/// threshold. Synthesis is skipped entirely in that case.
pub const FALLBACK_ANSWER: &str = "I couldn't find enough relevant information in the \
documents to answer this question. Please try rephrasing your question or adding more \
relevant documents.";

/// A black-box function that drafts answer text from retrieved context.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Draft an answer to `question` using only `context`, following
    /// the given structural `instructions`.
    async fn synthesize(&self, question: &str, context: &str, instructions: &str)
    -> Result<String>;
}
