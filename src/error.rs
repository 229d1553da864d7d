//! Error taxonomy for the reportqa-core crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ReportQaError>;

/// All failures surfaced by the core.
///
/// Ingestion-time errors (`DocumentNotFound` through `EmbeddingDimension`)
/// abort ingestion; `Generation` aborts only the question that triggered it
/// and leaves the index usable for subsequent questions.
#[derive(Debug, Error)]
pub enum ReportQaError {
    #[error("document not found at {path}")]
    DocumentNotFound { path: PathBuf },

    #[error("no reader accepts document {path}")]
    UnsupportedDocument { path: PathBuf },

    #[error("document extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("invalid chunker configuration: max_chars {max_chars} must exceed overlap {overlap}")]
    ChunkConfig { max_chars: usize, overlap: usize },

    #[error("embedding provider failed: {reason}")]
    Embedding { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimension { expected: usize, actual: usize },

    #[error("failed to persist index: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("index not found at {location}")]
    IndexNotFound { location: PathBuf },

    #[error("index artifact at {location} is invalid: {reason}")]
    IndexFormat {
        location: PathBuf,
        reason: &'static str,
    },

    #[error("generation provider failed: {reason}")]
    Generation { reason: String },
}
