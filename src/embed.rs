//! Embedding capability surface.
//!
//! The index never talks to a concrete embedding library; anything that can
//! turn text into a fixed-dimension vector plugs in here, including the
//! deterministic stubs used by tests.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identity of the embedding configuration an index was built with.
///
/// Persisted alongside the index so a reloaded artifact is self-describing.
/// Wiring the same provider back up for queries is a caller obligation; the
/// identity is how callers check they did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingIdentity {
    pub model_id: String,
    pub dimension: usize,
}

/// Capability: embed text into a fixed-dimension vector.
///
/// Implementations must be deterministic for a fixed model version.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text)?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize;

    fn model_id(&self) -> &str;

    fn identity(&self) -> EmbeddingIdentity {
        EmbeddingIdentity {
            model_id: self.model_id().to_string(),
            dimension: self.dimension(),
        }
    }
}
