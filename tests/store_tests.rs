//! Project store lifecycle tests: build, publish, list, delete, and the
//! all-or-nothing failure path.

use std::sync::Arc;

use async_trait::async_trait;
use pdf_rag::{
    DocumentExtractor, DocumentUpload, ExtractedDocument, MockEmbedder, PlainTextExtractor,
    ProjectStore, RagConfig, RagError, Result,
};
use tempfile::TempDir;

fn test_store(dir: &TempDir) -> Arc<ProjectStore> {
    let config =
        RagConfig::builder().chunk_size(80).chunk_overlap(16).build().unwrap();
    Arc::new(ProjectStore::new(
        dir.path(),
        Arc::new(PlainTextExtractor),
        Arc::new(MockEmbedder::new(64)),
        &config,
    ))
}

fn upload(filename: &str, text: &str) -> DocumentUpload {
    DocumentUpload::new(filename, text.as_bytes().to_vec())
}

/// An extractor that fails for every document, for abort-path tests.
struct FailingExtractor;

#[async_trait]
impl DocumentExtractor for FailingExtractor {
    async fn extract(&self, filename: &str, _bytes: &[u8]) -> Result<ExtractedDocument> {
        Err(RagError::ExtractionError {
            filename: filename.to_string(),
            message: "unreadable document".to_string(),
        })
    }
}

#[tokio::test]
async fn create_then_get_round_trips_the_descriptor() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let summary = store
        .create(
            "alice",
            "notes",
            "My Notes",
            Some("personal notes".to_string()),
            vec![
                upload("a.txt", "The capital of France is Paris. Paris is on the Seine."),
                upload("b.txt", "Rust is a systems programming language."),
            ],
        )
        .await
        .unwrap();

    assert_eq!(summary.document_count, 2);
    assert!(summary.total_chunk_count >= 2);

    let project = store.get("alice", "notes").await.unwrap();
    assert_eq!(project.project_id, "notes");
    assert_eq!(project.user_id, "alice");
    assert_eq!(project.project_name, "My Notes");
    assert_eq!(project.description.as_deref(), Some("personal notes"));
    assert_eq!(project.document_count, 2);
    assert_eq!(project.total_chunk_count, summary.total_chunk_count);
    assert_eq!(project.document_names(), vec!["a.txt", "b.txt"]);

    // The per-document chunk counts add up to the project total.
    let per_doc: usize = project.documents.iter().map(|d| d.chunk_count).sum();
    assert_eq!(per_doc, project.total_chunk_count);
}

#[tokio::test]
async fn get_unknown_project_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let err = store.get("alice", "missing").await.unwrap_err();
    assert!(matches!(err, RagError::NotFound { .. }));
}

#[tokio::test]
async fn list_is_scoped_to_the_user() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.create("alice", "p1", "One", None, vec![upload("a.txt", "alpha")]).await.unwrap();
    store.create("alice", "p2", "Two", None, vec![upload("b.txt", "beta")]).await.unwrap();
    store.create("bob", "p3", "Three", None, vec![upload("c.txt", "gamma")]).await.unwrap();

    let alice = store.list("alice").await.unwrap();
    let ids: Vec<&str> = alice.iter().map(|p| p.project_id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"p1") && ids.contains(&"p2"));

    // Sorted by creation time.
    assert!(alice[0].created_at <= alice[1].created_at);

    assert!(store.list("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_the_project_entirely() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.create("alice", "p1", "One", None, vec![upload("a.txt", "alpha beta")]).await.unwrap();
    store.delete("alice", "p1").await.unwrap();

    assert!(matches!(
        store.get("alice", "p1").await.unwrap_err(),
        RagError::NotFound { .. }
    ));
    assert!(store.load_index("alice", "p1").await.unwrap().is_none());
    assert!(!dir.path().join("alice").join("p1").exists());
}

#[tokio::test]
async fn delete_unknown_project_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let err = store.delete("alice", "missing").await.unwrap_err();
    assert!(matches!(err, RagError::NotFound { .. }));
}

#[tokio::test]
async fn documents_yielding_no_text_still_create_the_project() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let summary = store
        .create("alice", "empty", "Empty", None, vec![upload("blank.txt", "   \n\t  ")])
        .await
        .unwrap();
    assert_eq!(summary.document_count, 1);
    assert_eq!(summary.total_chunk_count, 0);

    let project = store.get("alice", "empty").await.unwrap();
    assert_eq!(project.total_chunk_count, 0);

    // No index artifacts are written for a zero-chunk project.
    assert!(store.load_index("alice", "empty").await.unwrap().is_none());
}

#[tokio::test]
async fn extraction_failure_aborts_the_whole_build() {
    let dir = TempDir::new().unwrap();
    let config = RagConfig::default();
    let store = Arc::new(ProjectStore::new(
        dir.path(),
        Arc::new(FailingExtractor),
        Arc::new(MockEmbedder::new(64)),
        &config,
    ));

    let err = store
        .create("alice", "broken", "Broken", None, vec![upload("bad.pdf", "irrelevant")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::ExtractionError { .. }));

    // No descriptor was published and the partial directory is gone.
    assert!(matches!(
        store.get("alice", "broken").await.unwrap_err(),
        RagError::NotFound { .. }
    ));
    assert!(!dir.path().join("alice").join("broken").exists());
}

#[tokio::test]
async fn load_index_preserves_chunk_alignment() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let text = "The quick brown fox jumps over the lazy dog. \
        Pack my box with five dozen liquor jugs. \
        How vexingly quick daft zebras jump.";
    let summary =
        store.create("alice", "p1", "One", None, vec![upload("a.txt", text)]).await.unwrap();

    let index = store.load_index("alice", "p1").await.unwrap().unwrap();
    assert_eq!(index.len(), summary.total_chunk_count);

    // Chunks come back in document order with derived ids intact.
    for position in 0..index.len() {
        let chunk = index.chunk(position).unwrap();
        assert_eq!(chunk.chunk_index, position);
        assert_eq!(chunk.chunk_id, format!("{}_chunk_{position}", chunk.doc_id));
        assert_eq!(chunk.filename, "a.txt");
    }
}

#[tokio::test]
async fn no_temp_files_survive_a_build() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.create("alice", "p1", "One", None, vec![upload("a.txt", "some text here")]).await.unwrap();

    let mut stack = vec![dir.path().to_path_buf()];
    while let Some(path) = stack.pop() {
        for entry in std::fs::read_dir(&path).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_dir() {
                stack.push(entry.path());
            } else {
                let name = entry.file_name();
                assert!(
                    !name.to_string_lossy().ends_with(".tmp"),
                    "leftover temp file: {:?}",
                    entry.path()
                );
            }
        }
    }
}

#[tokio::test]
async fn path_like_identifiers_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let err = store
        .create("../alice", "p1", "One", None, vec![upload("a.txt", "text")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));

    let err = store.get("alice", "a/b").await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}
