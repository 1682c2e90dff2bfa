//! Text chunking for ingestion.
//!
//! [`TextChunker`] splits extracted document text into overlapping,
//! size-bounded segments. Text is whitespace-normalized first, then walked in
//! windows of at most `chunk_size` characters; each window breaks at the
//! coarsest separator available, falling back to a hard character split.

use crate::config::RagConfig;
use crate::error::{RagError, Result};

/// Separator preferences, coarsest first. The separator stays attached to the
/// preceding chunk. After whitespace normalization only `"."` and `" "` can
/// match; the newline entries are retained from the splitter configuration so
/// the fallback order is explicit.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", " "];

/// Splits normalized text into overlapping chunks of at most `chunk_size`
/// characters.
///
/// Each chunk after the first re-starts `overlap` characters before the end of
/// the previous chunk, duplicating trailing context so retrieval does not lose
/// continuity across chunk boundaries.
///
/// # Example
///
/// ```rust
/// use pdf_rag::TextChunker;
///
/// let chunker = TextChunker::new(100, 20).unwrap();
/// let chunks = chunker.chunk("some long document text ...");
/// assert!(chunks.iter().all(|c| c.chars().count() <= 100));
/// ```
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextChunker {
    /// 1000-character chunks with 200 characters of overlap.
    fn default() -> Self {
        Self { chunk_size: 1000, overlap: 200 }
    }
}

impl TextChunker {
    /// Create a new `TextChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or `overlap` is
    /// not strictly less than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Create a chunker from an already-validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self { chunk_size: config.chunk_size, overlap: config.chunk_overlap }
    }

    /// Split `text` into chunks.
    ///
    /// Always succeeds: empty or whitespace-only input yields an empty vec,
    /// and chunks that are empty after trimming are discarded. Every returned
    /// chunk has at most `chunk_size` characters; the hard character split
    /// caps even a single unsplittable token.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = normalized.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![normalized];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(chars.len());
            let end = if window_end == chars.len() {
                window_end
            } else {
                self.break_position(&chars, start, window_end)
            };

            let piece: String = chars[start..end].iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }

            if end == chars.len() {
                break;
            }
            // Invariant: end > start + overlap, so the walk always advances.
            start = end - self.overlap;
        }

        chunks
    }

    /// Latest boundary of the coarsest separator inside `[start, window_end)`,
    /// or `window_end` for a hard split. A boundary is only taken if it leaves
    /// forward progress beyond the overlap.
    fn break_position(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        for sep in SEPARATORS {
            let sep_chars: Vec<char> = sep.chars().collect();
            let sep_len = sep_chars.len();
            let mut i = window_end;
            while i >= start + sep_len {
                if chars[i - sep_len..i] == sep_chars[..] {
                    if i > start + self.overlap {
                        return i;
                    }
                    // Earlier matches of this separator advance even less.
                    break;
                }
                i -= 1;
            }
        }
        window_end
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces and
/// trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunker = TextChunker::default();
        let chunks = chunker.chunk("a short sentence.");
        assert_eq!(chunks, vec!["a short sentence."]);
    }

    #[test]
    fn whitespace_runs_collapse_to_single_spaces() {
        let chunker = TextChunker::default();
        let chunks = chunker.chunk("line one\n\nline   two\tline three");
        assert_eq!(chunks, vec!["line one line two line three"]);
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let chunker = TextChunker::new(50, 10).unwrap();
        let text = "the quick brown fox jumps over the lazy dog. ".repeat(20);
        for chunk in chunker.chunk(&text) {
            assert!(chunk.chars().count() <= 50, "oversized chunk: {chunk:?}");
        }
    }

    #[test]
    fn prefers_sentence_breaks_over_word_breaks() {
        let chunker = TextChunker::new(40, 5).unwrap();
        let chunks = chunker.chunk("First sentence here. Second sentence follows after it.");
        // The first chunk ends at the sentence-terminal period.
        assert_eq!(chunks[0], "First sentence here.");
    }

    #[test]
    fn unsplittable_token_is_hard_split() {
        let chunker = TextChunker::new(10, 2).unwrap();
        let chunks = chunker.chunk(&"x".repeat(35));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert!(!chunks.is_empty());
    }

    #[test]
    fn consecutive_chunks_share_overlap_context() {
        let chunker = TextChunker::new(30, 10).unwrap();
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunker.chunk(text);
        assert!(chunks.len() >= 2);
        let normalized = normalize_whitespace(text);
        // Every chunk appears in the normalized text at increasing positions
        // with no uncovered characters between consecutive chunks.
        let mut search_from = 0;
        let mut covered_to = 0;
        for chunk in &chunks {
            let pos = normalized[search_from..]
                .find(chunk.as_str())
                .map(|p| p + search_from)
                .expect("chunk not found in normalized text");
            assert!(pos <= covered_to, "gap before chunk {chunk:?}");
            covered_to = covered_to.max(pos + chunk.len());
            search_from = pos;
        }
        assert_eq!(covered_to, normalized.len());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(10, 20).is_err());
    }
}
