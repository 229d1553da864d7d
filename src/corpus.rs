//! Segments and the deduplicated corpus.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Stable identifier derived from a segment's trimmed content hash.
pub type SegmentId = u64;

/// A bounded span of normalized page text, the atomic unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub text: String,
    /// 1-indexed number of the page this segment was cut from.
    pub page_number: u32,
}

impl Segment {
    #[must_use]
    pub fn new(text: String, page_number: u32) -> Self {
        let id = segment_id(&text);
        Self {
            id,
            text,
            page_number,
        }
    }
}

/// Derive a segment id from the BLAKE3 hash of the trimmed text.
///
/// Trimming means two spans that differ only in surrounding whitespace share
/// an id, matching the deduplication key.
#[must_use]
pub fn segment_id(text: &str) -> SegmentId {
    let hash = blake3::hash(text.trim().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Ordered, deduplicated sequence of segments for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    segments: Vec<Segment>,
}

impl Corpus {
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
}

/// Drop near-empty and duplicate segments, preserving first-occurrence order.
///
/// A segment is dropped when its trimmed text is shorter than `min_chars` or
/// byte-for-byte identical to an earlier kept segment's trimmed text. The
/// comparison is exact and case-sensitive.
#[must_use]
pub fn deduplicate(segments: Vec<Segment>, min_chars: usize) -> Corpus {
    let mut seen: HashSet<String> = HashSet::with_capacity(segments.len());
    let mut kept = Vec::with_capacity(segments.len());

    for segment in segments {
        let trimmed = segment.text.trim();
        if trimmed.len() < min_chars {
            tracing::debug!(
                page = segment.page_number,
                chars = trimmed.len(),
                "dropping segment below minimum length"
            );
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            kept.push(segment);
        }
    }

    Corpus { segments: kept }
}
