//! Answer generation over retrieved context.
//!
//! Generation is a single templated call to an external collaborator; the
//! prompts below carry the retrieved chunk texts verbatim, optionally
//! followed by a tail of the conversation so far.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// System prompt for document-grounded answering.
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that answers questions based on provided documents.\n\
Use the document context to provide accurate, detailed answers. If the answer isn't fully covered in the documents,\n\
say so clearly. Always cite which documents you're referencing when possible.";

/// How many trailing conversation turns are included in the user prompt.
pub const HISTORY_CONTEXT_TURNS: usize = 3;

/// One prior message of a conversation, carried into follow-up prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who spoke: typically `"user"` or `"assistant"`.
    pub role: String,
    /// The message text.
    pub content: String,
}

impl ChatTurn {
    /// Create a turn from a role and its message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

/// Build the user prompt for a query, its joined document context, and the
/// conversation so far. Only the last [`HISTORY_CONTEXT_TURNS`] turns are
/// included; an empty history adds nothing.
pub fn answer_user_prompt(query: &str, context: &str, history: &[ChatTurn]) -> String {
    let mut history_context = String::new();
    if !history.is_empty() {
        history_context.push_str("\n\nPrevious conversation:\n");
        let tail = history.len().saturating_sub(HISTORY_CONTEXT_TURNS);
        for turn in &history[tail..] {
            history_context.push_str(&turn.role);
            history_context.push_str(": ");
            history_context.push_str(&turn.content);
            history_context.push('\n');
        }
    }

    format!(
        "Based on the following documents, please answer this question: {query}\n\n\
Document context:\n{context}\n{history_context}\n\
Please provide a comprehensive answer based on the document content."
    )
}

/// Generates a natural-language answer from a system and user prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_adds_no_conversation_block() {
        let prompt = answer_user_prompt("a question", "some context", &[]);
        assert!(prompt.contains("a question"));
        assert!(prompt.contains("some context"));
        assert!(!prompt.contains("Previous conversation"));
    }

    #[test]
    fn only_the_last_three_turns_are_included() {
        let history = vec![
            ChatTurn::new("user", "first message"),
            ChatTurn::new("assistant", "second message"),
            ChatTurn::new("user", "third message"),
            ChatTurn::new("assistant", "fourth message"),
        ];
        let prompt = answer_user_prompt("q", "ctx", &history);
        assert!(prompt.contains("Previous conversation:"));
        assert!(!prompt.contains("first message"));
        assert!(prompt.contains("assistant: second message"));
        assert!(prompt.contains("user: third message"));
        assert!(prompt.contains("assistant: fourth message"));
    }

    #[test]
    fn history_sits_between_context_and_closing_instruction() {
        let history = vec![ChatTurn::new("user", "earlier question")];
        let prompt = answer_user_prompt("q", "ctx", &history);
        let context_at = prompt.find("Document context:").unwrap();
        let history_at = prompt.find("Previous conversation:").unwrap();
        let closing_at = prompt.find("Please provide a comprehensive answer").unwrap();
        assert!(context_at < history_at && history_at < closing_at);
    }
}
