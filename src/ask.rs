//! Retrieval-augmented answering over a built index.
//!
//! The anti-hallucination contract lives in the prompt: the model may only
//! use the supplied context and must reply with one exact fallback sentence
//! when the context does not contain the answer. The crate never
//! pattern-matches generated answers; hosts that want to detect the fallback
//! compare against [`fallback_sentence`] exactly.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DOCUMENT_LABEL, DEFAULT_TOP_K};
use crate::corpus::SegmentId;
use crate::embed::EmbeddingProvider;
use crate::error::Result;
use crate::vec::{RetrievedSegment, VecIndex};

/// Capability: generate text from a prompt.
///
/// Generally non-deterministic across calls; implementations should pin
/// temperature to zero or minimal for reproducibility, but exact stability
/// across provider versions is not guaranteed.
pub trait GenerationProvider: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// One question against the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Maximum number of segments retrieved as context.
    pub top_k: usize,
}

impl AskRequest {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Deployment-level knobs for answer synthesis.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Name the document goes by in the prompt and the fallback sentence,
    /// e.g. "Swiggy Annual Report".
    pub document_label: String,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            document_label: DEFAULT_DOCUMENT_LABEL.to_string(),
        }
    }
}

/// Structured citation pointing back into the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskCitation {
    /// 1-based position in the source list.
    pub index: usize,
    pub segment_id: SegmentId,
    pub page_number: u32,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AskStats {
    /// Time spent retrieving context in milliseconds.
    pub retrieval_ms: u128,
    /// Time spent generating the answer in milliseconds.
    pub synthesis_ms: u128,
    /// End-to-end latency in milliseconds.
    pub latency_ms: u128,
}

/// Answer plus the segments it was grounded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    /// Retrieved segments in retrieval order, unchanged.
    pub sources: Vec<RetrievedSegment>,
    pub citations: Vec<AskCitation>,
    pub stats: AskStats,
}

/// The exact sentence the model is instructed to reply with when the context
/// does not contain the answer.
#[must_use]
pub fn fallback_sentence(document_label: &str) -> String {
    format!("This information is not available in the {document_label}.")
}

/// Join retrieved segment texts, in retrieval order, separated by blank lines.
#[must_use]
pub fn build_context(sources: &[RetrievedSegment]) -> String {
    sources
        .iter()
        .map(|hit| hit.segment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the fixed grounded prompt for one question.
#[must_use]
pub fn build_prompt(question: &str, context: &str, document_label: &str) -> String {
    let fallback = fallback_sentence(document_label);
    format!(
        "You are an assistant that answers questions strictly from the provided {document_label} context.\n\
         \n\
         Use only the pieces of context below to answer the question.\n\
         \n\
         CRITICAL INSTRUCTIONS:\n\
         1. Answer ONLY using the information in the Context section.\n\
         2. If the answer cannot be found in the Context, reply EXACTLY with this phrase: \"{fallback}\"\n\
         3. Do not use outside knowledge, assumptions, or guesses.\n\
         4. When the answer is present, respond clearly and concisely using only that text.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}

impl VecIndex {
    /// Answer one question: retrieve context, render the grounded prompt,
    /// invoke the generator, and return the answer with its sources.
    ///
    /// A generator failure propagates as [`crate::ReportQaError::Generation`]
    /// and never masquerades as an answer; the index stays valid for
    /// subsequent questions.
    pub fn ask(
        &self,
        request: &AskRequest,
        options: &AskOptions,
        embedder: &dyn EmbeddingProvider,
        generator: &dyn GenerationProvider,
    ) -> Result<AskResponse> {
        let total_start = Instant::now();

        let sources = self.retrieve(&request.question, request.top_k, embedder)?;
        let retrieval_ms = total_start.elapsed().as_millis();

        let context = build_context(&sources);
        let prompt = build_prompt(&request.question, &context, &options.document_label);

        let synthesis_start = Instant::now();
        let answer = generator.generate(&prompt)?;
        let synthesis_ms = synthesis_start.elapsed().as_millis();

        let citations = build_citations(&sources);
        tracing::debug!(
            sources = sources.len(),
            retrieval_ms,
            synthesis_ms,
            "answered question"
        );

        Ok(AskResponse {
            question: request.question.clone(),
            answer,
            sources,
            citations,
            stats: AskStats {
                retrieval_ms,
                synthesis_ms,
                latency_ms: total_start.elapsed().as_millis(),
            },
        })
    }
}

fn build_citations(sources: &[RetrievedSegment]) -> Vec<AskCitation> {
    sources
        .iter()
        .enumerate()
        .map(|(idx, hit)| AskCitation {
            index: idx + 1,
            segment_id: hit.segment.id,
            page_number: hit.segment.page_number,
            distance: hit.distance,
        })
        .collect()
}
