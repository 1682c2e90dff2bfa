//! Error types for the `pdf-rag` crate.

use thiserror::Error;

/// Errors that can occur during project builds and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// Text extraction failed for a source document. Fatal to the whole build.
    #[error("Extraction error ({filename}): {message}")]
    ExtractionError {
        /// The filename of the document that failed to extract.
        filename: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding collaborator failed (quota, network, malformed response).
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// No project exists under the given key. Distinct from a project that
    /// exists but has no indexed chunks.
    #[error("Project not found: {user_id}/{project_id}")]
    NotFound {
        /// The user identifier.
        user_id: String,
        /// The project identifier.
        project_id: String,
    },

    /// Any other failure during search or result joining.
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File IO failure while reading or writing project artifacts.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Descriptor or artifact encoding/decoding failure.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RagError {
    fn from(e: serde_json::Error) -> Self {
        RagError::SerializationError(e.to_string())
    }
}

impl From<bincode::Error> for RagError {
    fn from(e: bincode::Error) -> Self {
        RagError::SerializationError(e.to_string())
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
