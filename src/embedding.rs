//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Project builds call [`embed_batch`](EmbeddingProvider::embed_batch)
/// once for all chunks of a document set; queries call it with a single-item
/// batch. The returned vectors are raw model output; callers normalize them
/// before indexing or searching.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns one vector per input, in input order, each of
    /// [`dimensions()`](EmbeddingProvider::dimensions) length.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text]).await?;
        results.pop().ok_or_else(|| crate::error::RagError::EmbeddingError {
            provider: "unknown".to_string(),
            message: "provider returned no embedding for a single-item batch".to_string(),
        })
    }

    /// The dimensionality of embeddings produced by this provider.
    ///
    /// Must match the dimension of any [`VectorIndex`](crate::VectorIndex)
    /// the embeddings are stored in.
    fn dimensions(&self) -> usize;
}
