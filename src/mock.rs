//! Deterministic collaborators for tests and offline development.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::AnswerGenerator;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, used instead of the std hasher so embeddings are reproducible
/// across runs and toolchains.
fn fnv1a(token: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A deterministic bag-of-words [`EmbeddingProvider`].
///
/// Each lowercase alphanumeric token is hashed into one of `dimensions`
/// buckets; the embedding counts token occurrences per bucket. Texts that
/// share vocabulary therefore score higher under cosine similarity than
/// unrelated texts, which is enough structure for retrieval tests without a
/// model dependency. Embedding the same text twice is bitwise identical.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
        {
            let bucket = (fnv1a(&token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An [`AnswerGenerator`] that returns a fixed reply.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    reply: String,
}

impl MockGenerator {
    /// Create a generator that always answers with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("This is a mock answer.")
    }
}

#[async_trait]
impl AnswerGenerator for MockGenerator {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

/// An [`AnswerGenerator`] that always fails, for error-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGenerator;

#[async_trait]
impl AnswerGenerator for FailingGenerator {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(crate::error::RagError::RetrievalError("generation backend unavailable".to_string()))
    }
}
