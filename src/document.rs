//! Data types for documents, chunks, projects, and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded segment of a document's text, the atomic retrievable unit.
///
/// Chunk IDs are derived deterministically as `{doc_id}_chunk_{chunk_index}`
/// and are unique within a project. Chunks are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier within the project.
    pub chunk_id: String,
    /// The ID of the source document.
    pub doc_id: String,
    /// Original filename of the source document.
    pub filename: String,
    /// Position of this chunk within its document (0-indexed).
    pub chunk_index: usize,
    /// The text content of the chunk.
    pub text: String,
}

impl Chunk {
    /// Create a chunk with its ID derived from `doc_id` and `chunk_index`.
    pub fn new(
        doc_id: impl Into<String>,
        filename: impl Into<String>,
        chunk_index: usize,
        text: impl Into<String>,
    ) -> Self {
        let doc_id = doc_id.into();
        Self {
            chunk_id: format!("{doc_id}_chunk_{chunk_index}"),
            doc_id,
            filename: filename.into(),
            chunk_index,
            text: text.into(),
        }
    }
}

/// Per-document provenance, aggregated into a [`Project`] descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInfo {
    /// Document identifier.
    pub doc_id: String,
    /// Original filename.
    pub filename: String,
    /// Number of pages in the source document.
    pub page_count: u32,
    /// Number of chunks produced from this document.
    pub chunk_count: usize,
    /// When the document was uploaded.
    pub upload_time: DateTime<Utc>,
}

/// The JSON descriptor for a project: an isolated, per-user collection of
/// documents plus its derived index and metadata.
///
/// Immutable after creation except for wholesale deletion. There is no
/// update-in-place path; adding a document requires rebuilding the project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique project identifier.
    pub project_id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Human-readable project name.
    pub project_name: String,
    /// Optional project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of documents in the project.
    pub document_count: usize,
    /// Total number of chunks across all documents.
    pub total_chunk_count: usize,
    /// Per-document metadata.
    pub documents: Vec<DocumentInfo>,
}

impl Project {
    /// Filenames of all documents in the project.
    pub fn document_names(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.filename.as_str()).collect()
    }
}

/// Counts returned from a successful project build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Number of documents processed.
    pub document_count: usize,
    /// Total number of chunks indexed.
    pub total_chunk_count: usize,
}

/// A raw document handed to [`ProjectStore::create`](crate::ProjectStore::create).
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Original filename (used for provenance and citations).
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Create an upload from a filename and raw bytes.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { filename: filename.into(), bytes }
    }
}

/// A retrieved [`Chunk`] paired with its cosine-similarity score.
///
/// Scores lie in `[-1, 1]`; higher is more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity between the query and the chunk embedding.
    pub score: f32,
}
