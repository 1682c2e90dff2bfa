//! Query-time retrieval: embed → search → threshold filter → join.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::normalize;
use crate::store::ProjectStore;

/// Default minimum cosine similarity for a chunk to be returned.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.1;

/// Retrieves relevance-ranked, attributed chunks for a query against one
/// project's index.
///
/// A missing index (project not built, or built from documents that yielded
/// no text) is a normal empty-result outcome, not an error. Embedding
/// failures surface as [`RagError::EmbeddingError`] so callers can distinguish
/// "nothing relevant" from "the query could not be run".
pub struct Retriever {
    store: Arc<ProjectStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    relevance_threshold: f32,
}

impl Retriever {
    /// Create a retriever with the default relevance threshold.
    pub fn new(store: Arc<ProjectStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder, relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD }
    }

    /// Override the relevance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold;
        self
    }

    /// Retrieve up to `max_documents` chunks relevant to `query`, in
    /// descending score order.
    ///
    /// The result may be shorter than `max_documents` when the threshold
    /// filters matches out or the project holds fewer chunks.
    pub async fn retrieve(
        &self,
        user_id: &str,
        project_id: &str,
        query: &str,
        max_documents: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let Some(index) = self.store.load_index(user_id, project_id).await? else {
            debug!(user_id, project_id, "no index for project, returning empty results");
            return Ok(Vec::new());
        };
        if index.is_empty() || max_documents == 0 {
            return Ok(Vec::new());
        }

        let mut query_embedding = self.embedder.embed(query).await?;
        normalize(&mut query_embedding);

        let k = max_documents.min(index.len());
        let (scores, positions) = index.search(&query_embedding, k)?;

        let mut results = Vec::new();
        for (score, position) in scores.into_iter().zip(positions) {
            if position < 0 {
                continue;
            }
            if score < self.relevance_threshold {
                continue;
            }
            let chunk = index.chunk(position as usize).ok_or_else(|| {
                RagError::RetrievalError(format!("search returned out-of-range position {position}"))
            })?;
            results.push(RetrievalResult { chunk: chunk.clone(), score });
        }

        info!(user_id, project_id, result_count = results.len(), "retrieved chunks");
        Ok(results)
    }
}
