//! Embedding seam: the black-box text → vector function.

use async_trait::async_trait;

use crate::error::Result;

/// A black-box function from text to a fixed-dimension vector.
///
/// The same embedder (and therefore the same dimensionality) must be
/// used at both indexing and query time. The default
/// [`embed_batch`](Embedder::embed_batch) embeds sequentially; backends
/// with native batching should override it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts.
    ///
    /// The default implementation embeds each text sequentially.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// The dimensionality of vectors produced by this embedder.
    fn dimensions(&self) -> usize;
}
