//! One-shot ingestion pipeline: extract, normalize, chunk, deduplicate.
//!
//! `DocumentProcessor` turns a document path into the `Corpus` the index is
//! built from. Ingestion runs to completion before any queries are served;
//! the processor holds no mutable state and can be reused across documents.

use std::path::Path;

use fs_err as fs;

use crate::chunk::PageChunker;
use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CHUNK_CHARS, DEFAULT_MIN_SEGMENT_CHARS,
};
use crate::corpus::{Corpus, deduplicate};
use crate::error::{ReportQaError, Result};
use crate::reader::{ReaderDiagnostics, ReaderHint, ReaderRegistry};
use crate::text::normalize_text;

/// Bytes sniffed from the front of a document for reader routing.
const MAGIC_SNIFF_LEN: usize = 8;

/// A single extracted page: 1-indexed number and text exactly as extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// All pages a reader produced for one document, in document order.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub pages: Vec<Page>,
}

/// Tuning knobs for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub max_chunk_chars: usize,
    pub chunk_overlap: usize,
    pub min_segment_chars: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            min_segment_chars: DEFAULT_MIN_SEGMENT_CHARS,
        }
    }
}

/// Result of ingesting one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    corpus: Corpus,
    reader_name: String,
    diagnostics: ReaderDiagnostics,
    pages_extracted: usize,
    pages_dropped_empty: usize,
}

impl ProcessedDocument {
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub fn into_corpus(self) -> Corpus {
        self.corpus
    }

    #[must_use]
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    #[must_use]
    pub fn diagnostics(&self) -> &ReaderDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn pages_extracted(&self) -> usize {
        self.pages_extracted
    }

    /// Pages whose text was empty after normalization.
    #[must_use]
    pub fn pages_dropped_empty(&self) -> usize {
        self.pages_dropped_empty
    }
}

/// Drives extract → normalize → chunk → dedup.
pub struct DocumentProcessor {
    registry: ReaderRegistry,
    chunker: PageChunker,
    min_segment_chars: usize,
}

impl DocumentProcessor {
    pub fn new(config: &ProcessorConfig) -> Result<Self> {
        let chunker = PageChunker::new(config.max_chunk_chars, config.chunk_overlap)?;
        Ok(Self {
            registry: ReaderRegistry::default(),
            chunker,
            min_segment_chars: config.min_segment_chars,
        })
    }

    /// Replace the default reader registry (e.g. to add a custom format).
    #[must_use]
    pub fn with_registry(mut self, registry: ReaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Ingest the document at `path` into a deduplicated corpus.
    pub fn process_path(&self, path: &Path) -> Result<ProcessedDocument> {
        if !path.is_file() {
            return Err(ReportQaError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path).map_err(|err| ReportQaError::Extraction {
            reason: format!("failed to read document: {err}"),
        })?;

        let extension = path.extension().and_then(|ext| ext.to_str());
        let sniff = &bytes[..bytes.len().min(MAGIC_SNIFF_LEN)];
        let hint = ReaderHint::new(extension).with_magic(Some(sniff));
        let reader =
            self.registry
                .find_reader(&hint)
                .ok_or_else(|| ReportQaError::UnsupportedDocument {
                    path: path.to_path_buf(),
                })?;

        let output = reader.extract(&bytes, &hint)?;
        for warning in &output.diagnostics.warnings {
            tracing::warn!(reader = %output.reader_name, "{warning}");
        }

        let pages_extracted = output.document.pages.len();
        let (corpus, pages_dropped_empty) = self.corpus_from_pages(output.document.pages);
        tracing::debug!(
            path = %path.display(),
            reader = %output.reader_name,
            pages = pages_extracted,
            dropped_empty = pages_dropped_empty,
            segments = corpus.len(),
            "ingested document"
        );

        Ok(ProcessedDocument {
            corpus,
            reader_name: output.reader_name,
            diagnostics: output.diagnostics,
            pages_extracted,
            pages_dropped_empty,
        })
    }

    /// Normalize, chunk, and deduplicate already-extracted pages.
    #[must_use]
    pub fn process_pages(&self, pages: Vec<Page>) -> Corpus {
        self.corpus_from_pages(pages).0
    }

    fn corpus_from_pages(&self, pages: Vec<Page>) -> (Corpus, usize) {
        let mut normalized = Vec::with_capacity(pages.len());
        let mut dropped = 0usize;
        for page in pages {
            let cleaned = normalize_text(&page.text);
            if cleaned.is_empty() {
                tracing::debug!(page = page.number, "page empty after normalization, dropped");
                dropped += 1;
                continue;
            }
            normalized.push(Page {
                number: page.number,
                text: cleaned,
            });
        }

        let segments = self.chunker.chunk_pages(&normalized);
        (deduplicate(segments, self.min_segment_chars), dropped)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(&ProcessorConfig::default()).expect("valid default config")
    }

    fn filler(topic: &str, sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("{topic} line {i} describes results for the reporting period."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn boilerplate_only_page_yields_no_segments() {
        let pages = vec![
            Page {
                number: 1,
                text: filler("Revenue", 6),
            },
            Page {
                number: 2,
                text: "Page 2\nhttps://example.com/ir\n2".to_string(),
            },
            Page {
                number: 3,
                text: filler("Liquidity", 6),
            },
        ];
        let corpus = processor().process_pages(pages);
        assert!(!corpus.is_empty());
        assert!(corpus.iter().all(|s| s.page_number != 2));
        assert!(corpus.iter().any(|s| s.page_number == 1));
        assert!(corpus.iter().any(|s| s.page_number == 3));
    }

    #[test]
    fn missing_document_is_reported() {
        let dir = tempdir().expect("tmp");
        let err = processor()
            .process_path(&dir.path().join("absent.pdf"))
            .expect_err("must fail");
        assert!(matches!(err, ReportQaError::DocumentNotFound { .. }));
    }

    #[test]
    fn unknown_binary_format_is_unsupported() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("blob.bin");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(&[0x00, 0xFF, 0x11, 0xFE, 0x00, 0xFF, 0x22, 0xFD])
            .expect("write");
        let err = processor().process_path(&path).expect_err("must fail");
        assert!(matches!(err, ReportQaError::UnsupportedDocument { .. }));
    }

    #[test]
    fn plain_text_document_round_trips() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("report.txt");
        let content = format!("{}\u{0c}{}", filler("Revenue", 6), filler("Outlook", 6));
        std::fs::write(&path, content).expect("write");

        let processed = processor().process_path(&path).expect("process");
        assert_eq!(processed.reader_name(), "plain_text");
        assert_eq!(processed.pages_extracted(), 2);
        assert_eq!(processed.pages_dropped_empty(), 0);
        assert!(!processed.corpus().is_empty());
        let pages: std::collections::BTreeSet<u32> = processed
            .corpus()
            .iter()
            .map(|s| s.page_number)
            .collect();
        assert_eq!(pages, [1, 2].into_iter().collect());
    }

    #[test]
    fn custom_registry_limits_supported_formats() {
        use crate::reader::PdfReader;

        let dir = tempdir().expect("tmp");
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "plain text the default registry would accept").expect("write");

        let mut registry = ReaderRegistry::new();
        registry.register(PdfReader);
        let processor = processor().with_registry(registry);
        let err = processor.process_path(&path).expect_err("must fail");
        assert!(matches!(err, ReportQaError::UnsupportedDocument { .. }));
    }

    #[test]
    fn dedup_invariants_hold_after_processing() {
        let repeated = filler("Segment", 8);
        let pages = vec![
            Page {
                number: 1,
                text: repeated.clone(),
            },
            Page {
                number: 2,
                text: repeated,
            },
        ];
        let corpus = processor().process_pages(pages);
        let mut seen = std::collections::HashSet::new();
        for segment in corpus.iter() {
            assert!(segment.text.trim().len() >= DEFAULT_MIN_SEGMENT_CHARS);
            assert!(seen.insert(segment.text.trim().to_string()), "duplicate kept");
        }
    }
}
