//! # pdf-rag
//!
//! Per-project document ingestion and vector retrieval.
//!
//! ## Overview
//!
//! Each project owned by a user is an isolated corpus: documents are
//! chunked, embedded, and indexed at creation time, then queried with
//! exact inner-product search over L2-normalized vectors. The pieces:
//!
//! - [`TextChunker`] - recursive separator-aware text splitting
//! - [`VectorIndex`] / [`ProjectIndex`] - exact cosine search with
//!   positionally aligned chunk metadata
//! - [`ProjectStore`] - durable per-project persistence with atomic
//!   descriptor-last publication
//! - [`Retriever`] - embed, search, threshold-filter, attribute
//! - [`RagAgent`] - end-to-end question answering with graceful failure
//!
//! Extraction, embedding, and answer generation are trait collaborators
//! ([`DocumentExtractor`], [`EmbeddingProvider`], [`AnswerGenerator`]);
//! OpenAI-backed implementations live behind the `openai` feature and a
//! PDF extractor behind the `pdf` feature. [`MockEmbedder`] and
//! [`MockGenerator`] support offline tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pdf_rag::{
//!     DocumentUpload, MockEmbedder, MockGenerator, PlainTextExtractor, ProjectStore,
//!     RagAgent, RagConfig,
//! };
//!
//! # async fn run() -> pdf_rag::Result<()> {
//! let config = RagConfig::default();
//! let store = Arc::new(ProjectStore::new(
//!     "./data",
//!     Arc::new(PlainTextExtractor),
//!     Arc::new(MockEmbedder::default()),
//!     &config,
//! ));
//!
//! let uploads = vec![DocumentUpload {
//!     filename: "notes.txt".to_string(),
//!     bytes: b"The capital of France is Paris.".to_vec(),
//! }];
//! store.create("alice", "trip-notes", "Trip notes", None, uploads).await?;
//!
//! let agent = RagAgent::builder()
//!     .store(Arc::clone(&store))
//!     .embedder(Arc::new(MockEmbedder::default()))
//!     .generator(Arc::new(MockGenerator::default()))
//!     .config(config)
//!     .build()?;
//!
//! let outcome = agent.answer("alice", "trip-notes", "What is the capital of France?").await;
//! println!("{}", outcome.answer);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod index;
pub mod limits;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod retriever;
pub mod store;

pub use agent::{ChatOutcome, NO_RESULTS_ANSWER, RagAgent, RagAgentBuilder};
pub use chunking::TextChunker;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, DocumentInfo, DocumentUpload, Project, ProjectSummary, RetrievalResult,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{DocumentExtractor, ExtractedDocument, PlainTextExtractor};
pub use generation::{
    ANSWER_SYSTEM_PROMPT, AnswerGenerator, ChatTurn, HISTORY_CONTEXT_TURNS, answer_user_prompt,
};
pub use index::{ProjectIndex, SENTINEL_POSITION, VectorIndex};
pub use limits::{DEFAULT_PROJECT_REQUEST_LIMIT, RequestBudget};
pub use mock::{FailingGenerator, MockEmbedder, MockGenerator};
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatGenerator, OpenAIEmbeddingProvider};
#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
pub use retriever::{DEFAULT_RELEVANCE_THRESHOLD, Retriever};
pub use store::ProjectStore;
