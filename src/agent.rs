//! The question-answering pipeline over a project's documents.
//!
//! [`RagAgent`] checks the request budget, validates the project (charging
//! the budget only once the project is known to exist), retrieves relevant
//! chunks, and asks the [`AnswerGenerator`] for a grounded answer.
//! It never returns a hard error: failures are folded into the
//! [`ChatOutcome`]'s `error` field so callers can always render a response,
//! while zero retrieved chunks is a normal outcome with no error indicator.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{ANSWER_SYSTEM_PROMPT, AnswerGenerator, ChatTurn, answer_user_prompt};
use crate::limits::RequestBudget;
use crate::retriever::Retriever;
use crate::store::ProjectStore;

/// The answer shown when retrieval produced nothing above the threshold.
pub const NO_RESULTS_ANSWER: &str = "I couldn't find any relevant information in your documents \
to answer this question. Please try rephrasing your query or make sure your documents contain \
information about this topic.";

/// The outcome of one question against one project.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The generated (or fallback) answer text.
    pub answer: String,
    /// Source document filenames, deduplicated, in first-retrieved order.
    pub sources: Vec<String>,
    /// Pipeline stages that ran, in order.
    pub processing_steps: Vec<String>,
    /// Set when the pipeline failed; absent for normal empty results.
    pub error: Option<String>,
}

impl ChatOutcome {
    fn failed(answer: impl Into<String>, step: &str, steps: &mut Vec<String>, error: String) -> Self {
        steps.push(step.to_string());
        Self { answer: answer.into(), sources: Vec::new(), processing_steps: steps.clone(), error: Some(error) }
    }
}

/// Retrieval-augmented question answering over one user's projects.
///
/// Construct via [`RagAgent::builder()`].
pub struct RagAgent {
    store: Arc<ProjectStore>,
    retriever: Retriever,
    generator: Arc<dyn AnswerGenerator>,
    request_budget: Option<Arc<RequestBudget>>,
    max_documents: usize,
}

impl RagAgent {
    /// Create a new [`RagAgentBuilder`].
    pub fn builder() -> RagAgentBuilder {
        RagAgentBuilder::default()
    }

    /// Answer `query` from the documents of `(user_id, project_id)`.
    pub async fn answer(&self, user_id: &str, project_id: &str, query: &str) -> ChatOutcome {
        self.answer_with_history(user_id, project_id, query, &[]).await
    }

    /// Answer `query` as a follow-up in an ongoing conversation.
    ///
    /// The tail of `history` (up to
    /// [`HISTORY_CONTEXT_TURNS`](crate::generation::HISTORY_CONTEXT_TURNS)
    /// turns) is carried into the generation prompt so the generator can
    /// resolve references to earlier exchanges. History never influences
    /// retrieval; only `query` is embedded.
    pub async fn answer_with_history(
        &self,
        user_id: &str,
        project_id: &str,
        query: &str,
        history: &[ChatTurn],
    ) -> ChatOutcome {
        let mut steps = vec!["routed_to_document_search".to_string()];

        // Limit is reported ahead of validation, but the budget is only
        // charged once the project is known to exist, so querying a missing
        // project cannot burn budget for a project created later.
        if let Some(budget) = &self.request_budget {
            if budget.is_exhausted(user_id, project_id) {
                return ChatOutcome::failed(
                    "",
                    "request_limit_exceeded",
                    &mut steps,
                    format!(
                        "Project request limit exceeded. Maximum {} requests per project.",
                        budget.limit()
                    ),
                );
            }
        }

        // A missing project is reported distinctly from one that exists but
        // retrieves nothing.
        match self.store.get(user_id, project_id).await {
            Ok(_) => {}
            Err(e @ RagError::NotFound { .. }) => {
                return ChatOutcome::failed("", "project_not_found", &mut steps, e.to_string());
            }
            Err(e) => {
                error!(user_id, project_id, error = %e, "project lookup failed");
                return ChatOutcome::failed("", "project_not_found", &mut steps, e.to_string());
            }
        }

        if let Some(budget) = &self.request_budget {
            if !budget.try_acquire(user_id, project_id) {
                return ChatOutcome::failed(
                    "",
                    "request_limit_exceeded",
                    &mut steps,
                    format!(
                        "Project request limit exceeded. Maximum {} requests per project.",
                        budget.limit()
                    ),
                );
            }
        }

        let results =
            match self.retriever.retrieve(user_id, project_id, query, self.max_documents).await {
                Ok(results) => results,
                Err(e) => {
                    error!(user_id, project_id, error = %e, "retrieval failed");
                    return ChatOutcome::failed(
                        format!("Sorry, I encountered an error: {e}"),
                        "retrieval_error",
                        &mut steps,
                        format!("Error during retrieval: {e}"),
                    );
                }
            };
        steps.push("retrieved_documents".to_string());

        if results.is_empty() {
            steps.push("generated_answer".to_string());
            return ChatOutcome {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                processing_steps: steps,
                error: None,
            };
        }

        let context =
            results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join(" ");
        let user_prompt = answer_user_prompt(query, &context, history);

        let answer = match self.generator.generate(ANSWER_SYSTEM_PROMPT, &user_prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(user_id, project_id, error = %e, "generation failed");
                return ChatOutcome::failed(
                    format!("Sorry, I encountered an error while generating the answer: {e}"),
                    "generation_error",
                    &mut steps,
                    format!("Error during generation: {e}"),
                );
            }
        };

        let mut sources: Vec<String> = Vec::new();
        for result in &results {
            if !sources.iter().any(|s| s == &result.chunk.filename) {
                sources.push(result.chunk.filename.clone());
            }
        }

        steps.push("generated_answer".to_string());
        info!(user_id, project_id, source_count = sources.len(), "answered query");

        ChatOutcome { answer, sources, processing_steps: steps, error: None }
    }
}

/// Builder for constructing a [`RagAgent`].
///
/// `store`, `embedder`, and `generator` are required; the retriever is
/// assembled from them with the configured threshold.
#[derive(Default)]
pub struct RagAgentBuilder {
    store: Option<Arc<ProjectStore>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
    request_budget: Option<Arc<RequestBudget>>,
    config: Option<RagConfig>,
}

impl RagAgentBuilder {
    /// Set the project store.
    pub fn store(mut self, store: Arc<ProjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the embedding provider used for queries.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attach a per-project lifetime request budget.
    pub fn request_budget(mut self, budget: Arc<RequestBudget>) -> Self {
        self.request_budget = Some(budget);
        self
    }

    /// Set the retrieval configuration (threshold and result count).
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`RagAgent`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagAgent> {
        let store =
            self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;
        let config = self.config.unwrap_or_default();

        let retriever = Retriever::new(Arc::clone(&store), embedder)
            .with_threshold(config.relevance_threshold);

        Ok(RagAgent {
            store,
            retriever,
            generator,
            request_budget: self.request_budget,
            max_documents: config.max_documents,
        })
    }
}
