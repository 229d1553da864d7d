//! PDF reader backed by `lopdf` with per-page extraction.
//!
//! Pages are extracted one at a time so a page that fails to decode is
//! skipped and recorded instead of aborting the rest of the document.

use lopdf::Document;
use serde_json::json;

use super::{DocumentReader, ReaderDiagnostics, ReaderHint, ReaderOutput};
use crate::error::{ReportQaError, Result};
use crate::extract::{ExtractedDocument, Page};

pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn supports(&self, hint: &ReaderHint<'_>) -> bool {
        if hint
            .magic_bytes
            .is_some_and(|magic| magic.starts_with(b"%PDF-"))
        {
            return true;
        }
        hint.extension
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn extract(&self, bytes: &[u8], _hint: &ReaderHint<'_>) -> Result<ReaderOutput> {
        let document = Document::load_mem(bytes).map_err(|err| ReportQaError::Extraction {
            reason: format!("failed to parse PDF: {err}"),
        })?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let mut diagnostics = ReaderDiagnostics {
            extra_metadata: json!({ "page_count": page_numbers.len() }),
            ..ReaderDiagnostics::default()
        };

        let mut pages = Vec::with_capacity(page_numbers.len());
        for number in page_numbers.iter().copied() {
            match document.extract_text(&[number]) {
                Ok(text) => pages.push(Page { number, text }),
                Err(err) => {
                    tracing::warn!(page = number, error = %err, "skipping undecodable PDF page");
                    diagnostics.record_warning(format!("page {number}: {err}"));
                    diagnostics.record_skipped_page(number);
                }
            }
        }

        if pages.is_empty() && !page_numbers.is_empty() {
            return Err(ReportQaError::Extraction {
                reason: format!("all {} pages failed to decode", page_numbers.len()),
            });
        }

        Ok(ReaderOutput::new(ExtractedDocument { pages }, self.name())
            .with_diagnostics(diagnostics))
    }
}
