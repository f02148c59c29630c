use crate::document_processor::WordSpan;

// @module: Spoken-word tracking from boundary offsets

/// Find the word index matching a boundary byte offset
///
/// Linear rescan of the whitespace-split word array on every call: boundary
/// events land at word starts on well-behaved engines, but offsets inside a
/// word or on the whitespace before it resolve to the nearest word. O(n) per
/// event, fine at utterance-cap sizes.
pub fn word_at_offset(words: &[WordSpan], offset: usize) -> Option<usize> {
    let mut result = None;
    for span in words {
        if span.start > offset {
            // Offset before the first word points at the first word
            return result.or(Some(span.index));
        }
        result = Some(span.index);
    }
    result
}

/// Tracks which word an utterance is currently on
///
/// An utterance may be a suffix of the document (restart-from-word), so the
/// tracker carries the base index that maps utterance-relative word indices
/// back onto document-absolute ones.
#[derive(Debug, Clone)]
pub struct HighlightTracker {
    /// Word array of the utterance text (not the whole document)
    words: Vec<WordSpan>,
    /// Document word index of the utterance's first word
    base_index: usize,
    /// Last utterance-relative word index seen
    current: Option<usize>,
}

impl HighlightTracker {
    /// Create a tracker for an utterance starting at the given document word
    pub fn new(words: Vec<WordSpan>, base_index: usize) -> Self {
        HighlightTracker {
            words,
            base_index,
            current: None,
        }
    }

    /// Record a boundary event, returning the absolute word index it maps to
    pub fn on_boundary(&mut self, char_offset: usize) -> Option<usize> {
        let index = word_at_offset(&self.words, char_offset)?;
        self.current = Some(index);
        Some(self.base_index + index)
    }

    /// Absolute index of the word currently being spoken
    pub fn current_word(&self) -> Option<usize> {
        self.current.map(|index| self.base_index + index)
    }

    /// Text of the word currently being spoken
    pub fn current_word_text(&self) -> Option<&str> {
        self.current
            .and_then(|index| self.words.get(index))
            .map(|span| span.text.as_str())
    }

    /// Number of words in the utterance
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}
