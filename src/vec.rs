//! In-memory exact nearest-neighbor index over corpus segments.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, Segment};
use crate::embed::{EmbeddingIdentity, EmbeddingProvider};
use crate::error::{ReportQaError, Result};

/// Similarity index mapping segment embeddings back to their segments.
///
/// Immutable after `build` or `load`; `retrieve` and `ask` take `&self` and
/// are safe for concurrent readers.
#[derive(Debug, Clone)]
pub struct VecIndex {
    pub(crate) identity: EmbeddingIdentity,
    pub(crate) segments: Vec<Segment>,
    pub(crate) vectors: Vec<Vec<f32>>,
}

/// One retrieval hit: the segment plus its rank and cosine distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSegment {
    /// 1-based rank in the result list.
    pub rank: usize,
    /// Cosine distance to the question embedding (smaller is closer).
    pub distance: f32,
    pub segment: Segment,
}

impl VecIndex {
    /// Embed every corpus segment and build the index.
    ///
    /// All-or-nothing: a provider failure, a wrong-dimension vector, or a
    /// non-finite component on any segment fails the whole build. Partial
    /// corpora are never indexed.
    pub fn build(corpus: &Corpus, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let identity = provider.identity();
        let mut vectors = Vec::with_capacity(corpus.len());
        for segment in corpus.segments() {
            let vector = provider.embed(&segment.text)?;
            validate_vector(&vector, identity.dimension)?;
            vectors.push(vector);
        }
        tracing::debug!(
            segments = corpus.len(),
            dimension = identity.dimension,
            model = %identity.model_id,
            "built vector index"
        );
        Ok(Self {
            identity,
            segments: corpus.segments().to_vec(),
            vectors,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.identity.dimension
    }

    #[must_use]
    pub fn identity(&self) -> &EmbeddingIdentity {
        &self.identity
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Return the `k` segments closest to `question`, ordered by ascending
    /// cosine distance with ties broken by corpus insertion order.
    ///
    /// An empty index yields an empty result without consulting the provider.
    /// Read-only; never mutates the index.
    pub fn retrieve(
        &self,
        question: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<RetrievedSegment>> {
        if self.segments.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = provider.embed(question)?;
        if query.len() != self.identity.dimension {
            return Err(ReportQaError::EmbeddingDimension {
                expected: self.identity.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(ordinal, vector)| (ordinal, cosine_distance(&query, vector)))
            .collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(idx, (ordinal, distance))| RetrievedSegment {
                rank: idx + 1,
                distance,
                segment: self.segments[ordinal].clone(),
            })
            .collect())
    }
}

fn validate_vector(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(ReportQaError::EmbeddingDimension {
            expected,
            actual: vector.len(),
        });
    }
    if vector.iter().any(|component| !component.is_finite()) {
        return Err(ReportQaError::Embedding {
            reason: "provider returned a non-finite vector component".to_string(),
        });
    }
    Ok(())
}

/// Cosine distance in `[0, 2]`; zero-norm vectors compare as maximally far.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut sum_a = 0.0f32;
    let mut sum_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        sum_a += x * x;
        sum_b += y * y;
    }

    if sum_a <= f32::EPSILON || sum_b <= f32::EPSILON {
        0.0
    } else {
        dot / (sum_a.sqrt() * sum_b.sqrt())
    }
}
