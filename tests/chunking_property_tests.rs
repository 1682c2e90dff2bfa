//! Property tests for the text chunker.

use pdf_rag::chunking::normalize_whitespace;
use pdf_rag::TextChunker;
use proptest::prelude::*;

/// Text with words, punctuation, and uneven whitespace.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,12}[.]?[ \n\t]{1,3}", 0..120)
        .prop_map(|words| words.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every chunk respects the size bound, for any text and any valid
    /// `(chunk_size, overlap)` pair.
    #[test]
    fn chunks_never_exceed_chunk_size(
        text in arb_text(),
        chunk_size in 5usize..200,
        overlap_frac in 0usize..100,
    ) {
        let overlap = overlap_frac * (chunk_size - 1) / 100;
        let chunker = TextChunker::new(chunk_size, overlap).unwrap();
        for chunk in chunker.chunk(&text) {
            prop_assert!(chunk.chars().count() <= chunk_size);
        }
    }

    /// The chunks jointly cover the normalized text: the first chunk starts
    /// it, the last chunk ends it, and every character lies inside some
    /// occurrence of some chunk.
    #[test]
    fn chunks_cover_the_normalized_text_without_gaps(
        text in arb_text(),
        chunk_size in 10usize..120,
    ) {
        let overlap = chunk_size / 5;
        let chunker = TextChunker::new(chunk_size, overlap).unwrap();
        let normalized = normalize_whitespace(&text);
        let chunks = chunker.chunk(&text);

        if normalized.is_empty() {
            prop_assert!(chunks.is_empty());
            return Ok(());
        }

        prop_assert!(normalized.starts_with(chunks.first().unwrap().as_str()));
        prop_assert!(normalized.ends_with(chunks.last().unwrap().as_str()));

        // Generated text is ASCII, so byte indexing is character indexing.
        let bytes = normalized.as_bytes();
        let mut covered = vec![false; bytes.len()];
        for chunk in &chunks {
            let needle = chunk.as_bytes();
            for start in 0..=bytes.len() - needle.len() {
                if &bytes[start..start + needle.len()] == needle {
                    covered[start..start + needle.len()].iter_mut().for_each(|c| *c = true);
                }
            }
        }
        let uncovered = covered.iter().filter(|c| !**c).count();
        prop_assert_eq!(uncovered, 0, "{} characters not covered by any chunk", uncovered);
    }

    /// Chunking is deterministic.
    #[test]
    fn chunking_is_deterministic(text in arb_text()) {
        let chunker = TextChunker::new(50, 10).unwrap();
        prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    /// Chunks never carry leading or trailing whitespace and are never empty.
    #[test]
    fn chunks_are_trimmed_and_non_empty(text in arb_text(), chunk_size in 5usize..80) {
        let chunker = TextChunker::new(chunk_size, chunk_size / 4).unwrap();
        for chunk in chunker.chunk(&text) {
            prop_assert!(!chunk.is_empty());
            prop_assert_eq!(chunk.trim(), chunk.as_str());
        }
    }
}
