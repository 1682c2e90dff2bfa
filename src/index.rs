//! Exact vector index and the project-level owning type.
//!
//! [`VectorIndex`] is a flat (brute-force) inner-product index over
//! L2-normalized vectors, so inner product equals cosine similarity. Exact
//! search is deliberate: project indexes are small and approximate indexing is
//! out of scope.
//!
//! [`ProjectIndex`] binds the vector index to its ordered chunk store behind
//! one type, so position *i* in the index always corresponds to chunk *i* for
//! the lifetime of the project.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// Sentinel position returned by [`VectorIndex::search`] for unfilled slots
/// when fewer than `k` vectors exist. Callers must filter it out.
pub const SENTINEL_POSITION: i64 = -1;

/// L2-normalize a vector in place. Zero vectors are left unchanged.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// L2-normalize a batch of vectors in place.
pub fn normalize_all(vectors: &mut [Vec<f32>]) {
    for vector in vectors {
        normalize(vector);
    }
}

/// A flat exact-search index over fixed-dimension vectors.
///
/// Vectors are stored row-major in insertion order; search computes the inner
/// product against every stored vector. Append-only within a build, never
/// mutated after the project is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::ConfigError("index dimension must be greater than zero".to_string()));
        }
        Ok(Self { dimension, data: Vec::new() })
    }

    /// The configured vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a single vector, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalError`] on a dimension mismatch.
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::RetrievalError(format!(
                "vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Append a batch of vectors in the given order.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            self.add(vector)?;
        }
        Ok(())
    }

    /// Exact top-`k` search by inner product.
    ///
    /// Returns `(scores, positions)` in descending score order; ties resolve
    /// to the lower position (first inserted wins). If fewer than `k` vectors
    /// exist, the remaining slots carry [`SENTINEL_POSITION`] and
    /// `f32::NEG_INFINITY` scores.
    ///
    /// The query must be normalized identically to the stored vectors or the
    /// scores are meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalError`] on a query dimension mismatch.
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<i64>)> {
        if query.len() != self.dimension {
            return Err(RagError::RetrievalError(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| {
                let score: f32 = row.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                (score, position)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1))
        });

        let mut scores = Vec::with_capacity(k);
        let mut positions = Vec::with_capacity(k);
        for slot in 0..k {
            match scored.get(slot) {
                Some(&(score, position)) => {
                    scores.push(score);
                    positions.push(position as i64);
                }
                None => {
                    scores.push(f32::NEG_INFINITY);
                    positions.push(SENTINEL_POSITION);
                }
            }
        }

        debug!(index_len = self.len(), k, "searched vector index");
        Ok((scores, positions))
    }
}

/// The per-project pairing of a [`VectorIndex`] with its ordered chunk store.
///
/// `add` appends a vector and its chunk as one operation, which is the only
/// way to grow either sequence. This makes the positional-alignment invariant
/// structural instead of a convention two arrays have to uphold separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIndex {
    index: VectorIndex,
    chunks: Vec<Chunk>,
}

impl ProjectIndex {
    /// Create an empty project index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        Ok(Self { index: VectorIndex::new(dimension)?, chunks: Vec::new() })
    }

    /// Reassemble a project index from its persisted artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalError`] if the two artifacts disagree in length,
    /// which would mean the alignment invariant was violated on disk.
    pub fn from_parts(index: VectorIndex, chunks: Vec<Chunk>) -> Result<Self> {
        if index.len() != chunks.len() {
            return Err(RagError::RetrievalError(format!(
                "index holds {} vectors but chunk store holds {} chunks",
                index.len(),
                chunks.len()
            )));
        }
        Ok(Self { index, chunks })
    }

    /// Normalize `vector` and append it together with its chunk.
    pub fn add(&mut self, mut vector: Vec<f32>, chunk: Chunk) -> Result<()> {
        normalize(&mut vector);
        self.index.add(&vector)?;
        self.chunks.push(chunk);
        Ok(())
    }

    /// Number of (vector, chunk) pairs.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the project index is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The configured vector dimension.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// The chunk at `position`, if in range.
    pub fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    /// Exact top-`k` search; see [`VectorIndex::search`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<i64>)> {
        self.index.search(query, k)
    }

    /// Split into the two persisted artifacts.
    pub fn into_parts(self) -> (VectorIndex, Vec<Chunk>) {
        (self.index, self.chunks)
    }
}
