//! Durable per-project storage.
//!
//! A project lives under `{data_dir}/{user_id}/{project_id}/`:
//!
//! ```text
//! documents/{doc_id}_{filename}   raw uploaded bytes
//! embeddings/index.bin            vector index artifact (bincode)
//! embeddings/chunks.bin           ordered chunk records (bincode)
//! project.json                    project descriptor
//! ```
//!
//! Builds are all-or-nothing: artifacts are written first, each through a
//! temp-file rename, and the descriptor is published last. A concurrent
//! reader therefore sees either `NotFound` or a complete project, never a
//! descriptor without its backing index. There is no update-in-place path;
//! adding a document means rebuilding the project.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunking::TextChunker;
use crate::config::RagConfig;
use crate::document::{Chunk, DocumentInfo, DocumentUpload, Project, ProjectSummary};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::DocumentExtractor;
use crate::index::{ProjectIndex, VectorIndex};

const DESCRIPTOR_FILE: &str = "project.json";
const EMBEDDINGS_DIR: &str = "embeddings";
const DOCUMENTS_DIR: &str = "documents";
const INDEX_FILE: &str = "index.bin";
const CHUNKS_FILE: &str = "chunks.bin";

/// Durable mapping from `(user_id, project_id)` to a project's index
/// artifacts and descriptor.
///
/// Projects are independent of one another; all methods take `&self` and the
/// store is freely shareable across tasks.
pub struct ProjectStore {
    data_dir: PathBuf,
    extractor: Arc<dyn DocumentExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: TextChunker,
}

impl ProjectStore {
    /// Create a store rooted at `data_dir`.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        extractor: Arc<dyn DocumentExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            extractor,
            embedder,
            chunker: TextChunker::from_config(config),
        }
    }

    fn project_dir(&self, user_id: &str, project_id: &str) -> PathBuf {
        self.data_dir.join(user_id).join(project_id)
    }

    /// Build a project from a batch of documents and publish it.
    ///
    /// For each upload this persists the raw bytes, extracts text and page
    /// count, and chunks the text. If any chunks were produced across the
    /// whole batch, all of them are embedded in one batched call, normalized,
    /// and written as index + chunk artifacts before the descriptor is
    /// published. A batch yielding zero chunks still creates the project,
    /// with `total_chunk_count == 0` and no index artifacts.
    ///
    /// # Errors
    ///
    /// Extraction or embedding failure for any document aborts the whole
    /// build; the partially written project directory is removed best-effort
    /// and no descriptor is published.
    pub async fn create(
        &self,
        user_id: &str,
        project_id: &str,
        project_name: &str,
        description: Option<String>,
        uploads: Vec<DocumentUpload>,
    ) -> Result<ProjectSummary> {
        validate_id("user_id", user_id)?;
        validate_id("project_id", project_id)?;

        let project_dir = self.project_dir(user_id, project_id);
        let result = self
            .build(&project_dir, user_id, project_id, project_name, description, uploads)
            .await;

        if result.is_err() {
            // All-or-nothing: drop whatever was written before the failure.
            if let Err(e) = fs::remove_dir_all(&project_dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(user_id, project_id, error = %e, "failed to clean up aborted build");
                }
            }
        }
        result
    }

    async fn build(
        &self,
        project_dir: &Path,
        user_id: &str,
        project_id: &str,
        project_name: &str,
        description: Option<String>,
        uploads: Vec<DocumentUpload>,
    ) -> Result<ProjectSummary> {
        fs::create_dir_all(project_dir.join(DOCUMENTS_DIR)).await?;
        fs::create_dir_all(project_dir.join(EMBEDDINGS_DIR)).await?;

        let mut all_chunks: Vec<Chunk> = Vec::new();
        let mut documents: Vec<DocumentInfo> = Vec::new();

        for upload in &uploads {
            let doc_id = Uuid::new_v4().to_string();

            let stored_name = format!("{doc_id}_{}", sanitize_filename(&upload.filename));
            fs::write(project_dir.join(DOCUMENTS_DIR).join(&stored_name), &upload.bytes).await?;

            let extracted = self.extractor.extract(&upload.filename, &upload.bytes).await?;
            let chunk_texts = self.chunker.chunk(&extracted.text);
            debug!(
                user_id,
                project_id,
                filename = %upload.filename,
                chunk_count = chunk_texts.len(),
                "chunked document"
            );

            let chunk_count = chunk_texts.len();
            for (i, text) in chunk_texts.into_iter().enumerate() {
                all_chunks.push(Chunk::new(&doc_id, &upload.filename, i, text));
            }

            documents.push(DocumentInfo {
                doc_id,
                filename: upload.filename.clone(),
                page_count: extracted.page_count,
                chunk_count,
                upload_time: Utc::now(),
            });
        }

        let total_chunk_count = all_chunks.len();
        if total_chunk_count > 0 {
            let texts: Vec<&str> = all_chunks.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            drop(texts);

            if embeddings.len() != total_chunk_count {
                return Err(RagError::EmbeddingError {
                    provider: "unknown".to_string(),
                    message: format!(
                        "provider returned {} embeddings for {} chunks",
                        embeddings.len(),
                        total_chunk_count
                    ),
                });
            }

            let mut project_index = ProjectIndex::new(self.embedder.dimensions())?;
            for (vector, chunk) in embeddings.into_iter().zip(all_chunks.into_iter()) {
                project_index.add(vector, chunk)?;
            }

            let (index, chunks) = project_index.into_parts();
            let embeddings_dir = project_dir.join(EMBEDDINGS_DIR);
            write_atomic(&embeddings_dir.join(INDEX_FILE), &bincode::serialize(&index)?).await?;
            write_atomic(&embeddings_dir.join(CHUNKS_FILE), &bincode::serialize(&chunks)?).await?;
        }

        let descriptor = Project {
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            project_name: project_name.to_string(),
            description,
            created_at: Utc::now(),
            document_count: documents.len(),
            total_chunk_count,
            documents,
        };

        // Descriptor last: its presence is what makes the project visible.
        write_atomic(&project_dir.join(DESCRIPTOR_FILE), &serde_json::to_vec_pretty(&descriptor)?)
            .await?;

        info!(
            user_id,
            project_id,
            document_count = descriptor.document_count,
            total_chunk_count,
            "created project"
        );

        Ok(ProjectSummary { document_count: descriptor.document_count, total_chunk_count })
    }

    /// Load a project descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if no descriptor exists at that key.
    pub async fn get(&self, user_id: &str, project_id: &str) -> Result<Project> {
        validate_id("user_id", user_id)?;
        validate_id("project_id", project_id)?;

        let path = self.project_dir(user_id, project_id).join(DESCRIPTOR_FILE);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RagError::NotFound {
                    user_id: user_id.to_string(),
                    project_id: project_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// List all project descriptors for a user.
    ///
    /// A user with no projects yields an empty vec. Directories without a
    /// descriptor (aborted or in-flight builds) are skipped; unparseable
    /// descriptors are skipped with a warning.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Project>> {
        validate_id("user_id", user_id)?;

        let user_dir = self.data_dir.join(user_id);
        let mut entries = match fs::read_dir(&user_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let descriptor_path = entry.path().join(DESCRIPTOR_FILE);
            let bytes = match fs::read(&descriptor_path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_slice::<Project>(&bytes) {
                Ok(project) => projects.push(project),
                Err(e) => {
                    warn!(user_id, path = %descriptor_path.display(), error = %e,
                        "skipping unparseable project descriptor");
                }
            }
        }

        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }

    /// Delete a project wholesale: descriptor, artifacts, and raw documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if the project does not exist.
    pub async fn delete(&self, user_id: &str, project_id: &str) -> Result<()> {
        // Existence is defined by the descriptor.
        self.get(user_id, project_id).await?;
        fs::remove_dir_all(self.project_dir(user_id, project_id)).await?;
        info!(user_id, project_id, "deleted project");
        Ok(())
    }

    /// Load the index + chunk artifacts for a project.
    ///
    /// Returns `Ok(None)` when either artifact is missing, which covers both
    /// "no project/index yet" and the deliberate zero-chunk state. Queries
    /// against such projects return empty results, never an error.
    pub async fn load_index(&self, user_id: &str, project_id: &str) -> Result<Option<ProjectIndex>> {
        validate_id("user_id", user_id)?;
        validate_id("project_id", project_id)?;

        let embeddings_dir = self.project_dir(user_id, project_id).join(EMBEDDINGS_DIR);

        let index_bytes = match fs::read(embeddings_dir.join(INDEX_FILE)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let chunk_bytes = match fs::read(embeddings_dir.join(CHUNKS_FILE)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let index: VectorIndex = bincode::deserialize(&index_bytes)?;
        let chunks: Vec<Chunk> = bincode::deserialize(&chunk_bytes)?;
        Ok(Some(ProjectIndex::from_parts(index, chunks)?))
    }
}

/// Write `bytes` to `path` through a temp file + rename, so readers never
/// observe a partially written artifact.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RagError::ConfigError(format!("invalid artifact path: {}", path.display())))?;
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Identifiers become path components, so they must be plain names.
fn validate_id(kind: &str, value: &str) -> Result<()> {
    let ok = !value.is_empty()
        && value != "."
        && value != ".."
        && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(RagError::ConfigError(format!("invalid {kind}: {value:?}")))
    }
}

/// Keep only the final path component of an uploaded filename.
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("document")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_id_rejects_path_components() {
        assert!(validate_id("user_id", "abc-123_DEF.x").is_ok());
        assert!(validate_id("user_id", "").is_err());
        assert!(validate_id("user_id", "..").is_err());
        assert!(validate_id("user_id", "a/b").is_err());
        assert!(validate_id("user_id", "a\\b").is_err());
    }

    #[test]
    fn sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "document");
    }
}
