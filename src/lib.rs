#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal/self-documenting functions don't need extensive docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: casts here are bounded by real-world constraints (page counts,
// chunk sizes) and are reviewed at the call site.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]

/// The reportqa-core crate version (matches `Cargo.toml`).
pub const REPORTQA_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ask;
pub mod chunk;
pub mod constants;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod extract;
pub mod reader;
mod store;
pub mod text;
pub mod vec;

// API-based embedding and generation providers (OpenAI, Groq, etc.) - requires network
#[cfg(feature = "api_providers")]
pub mod api_providers;

pub use ask::{
    AskCitation, AskOptions, AskRequest, AskResponse, AskStats, GenerationProvider, build_context,
    build_prompt, fallback_sentence,
};
pub use chunk::PageChunker;
pub use constants::*;
pub use corpus::{Corpus, Segment, SegmentId, deduplicate, segment_id};
pub use embed::{EmbeddingIdentity, EmbeddingProvider};
pub use error::{ReportQaError, Result};
pub use extract::{DocumentProcessor, ExtractedDocument, Page, ProcessedDocument, ProcessorConfig};
pub use reader::{
    DocumentReader, PdfReader, PlainTextReader, ReaderDiagnostics, ReaderHint, ReaderOutput,
    ReaderRegistry,
};
pub use text::normalize_text;
pub use vec::{RetrievedSegment, VecIndex};

#[cfg(feature = "api_providers")]
pub use api_providers::{HttpProviderConfig, OpenAiEmbedder, OpenAiGenerator};
