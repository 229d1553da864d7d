//! Hierarchical page chunking with a fixed overlap.
//!
//! Splitting prefers paragraph boundaries, then line boundaries, then
//! sentence-ending punctuation, then plain spaces, and only falls back to a
//! hard cut when no separator lands in the back half of the window. Chunks
//! never span two pages and are contiguous substrings of the page text, so a
//! page can be reconstructed from its chunks by dropping the overlap.

use crate::constants::{DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CHUNK_CHARS};
use crate::corpus::Segment;
use crate::error::{ReportQaError, Result};
use crate::extract::Page;

/// Splits normalized page text into overlapping segments.
///
/// Stateless and deterministic: the same `(pages, max_chars, overlap)` triple
/// always yields the same segments.
#[derive(Debug, Clone)]
pub struct PageChunker {
    max_chars: usize,
    overlap: usize,
}

impl Default for PageChunker {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl PageChunker {
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        if max_chars <= overlap {
            return Err(ReportQaError::ChunkConfig { max_chars, overlap });
        }
        Ok(Self { max_chars, overlap })
    }

    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every page independently, tagging each segment with the page
    /// number of its source page.
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Segment> {
        let mut segments = Vec::new();
        for page in pages {
            for span in self.chunk_text(&page.text) {
                segments.push(Segment::new(span.to_string(), page.number));
            }
        }
        segments
    }

    /// Split one text into contiguous, overlapping spans.
    pub fn chunk_text<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut spans = Vec::new();
        if text.is_empty() {
            return spans;
        }

        let mut start = 0usize;
        while start < text.len() {
            if text.len() - start <= self.max_chars {
                spans.push(&text[start..]);
                break;
            }

            // Window end aligned to a char boundary at or below max_chars.
            let mut window_end = start + self.max_chars;
            while !text.is_char_boundary(window_end) {
                window_end -= 1;
            }
            let window = &text[start..window_end];
            let end = start + break_index(window);
            spans.push(&text[start..end]);

            // Step back by the overlap for the next span, staying on a char
            // boundary and always making forward progress.
            let mut next = end.saturating_sub(self.overlap);
            while !text.is_char_boundary(next) {
                next += 1;
            }
            if next <= start {
                next = end;
            }
            start = next;
        }
        spans
    }
}

/// Pick the byte index to cut `window` at, preferring the latest separator in
/// the back half so chunks do not degenerate.
fn break_index(window: &str) -> usize {
    let floor = window.len() / 2;

    if let Some(pos) = window.rfind("\n\n") {
        if pos >= floor {
            return pos + 2;
        }
    }
    if let Some(pos) = window.rfind('\n') {
        if pos >= floor {
            return pos + 1;
        }
    }
    if let Some(pos) = rfind_sentence_end(window) {
        if pos >= floor {
            return pos;
        }
    }
    if let Some(pos) = window.rfind(' ') {
        if pos >= floor {
            return pos + 1;
        }
    }
    window.len()
}

/// Byte index just past the last sentence terminator that ends a sentence
/// (followed by a space or the window edge).
fn rfind_sentence_end(window: &str) -> Option<usize> {
    let bytes = window.as_bytes();
    for i in (0..bytes.len()).rev() {
        if matches!(bytes[i], b'.' | b'!' | b'?') && (i + 1 == bytes.len() || bytes[i + 1] == b' ')
        {
            return Some(i + 1);
        }
    }
    None
}
