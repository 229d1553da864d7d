//! Plain-text reader; form feeds delimit pages.

use super::{DocumentReader, ReaderHint, ReaderOutput};
use crate::error::{ReportQaError, Result};
use crate::extract::{ExtractedDocument, Page};

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

pub struct PlainTextReader;

impl DocumentReader for PlainTextReader {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn supports(&self, hint: &ReaderHint<'_>) -> bool {
        if hint
            .extension
            .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)))
        {
            return true;
        }
        // Last-resort passthrough: accept content whose sniffed prefix looks
        // like UTF-8 text.
        hint.magic_bytes.is_some_and(looks_like_utf8)
    }

    fn extract(&self, bytes: &[u8], _hint: &ReaderHint<'_>) -> Result<ReaderOutput> {
        let text =
            String::from_utf8(bytes.to_vec()).map_err(|_| ReportQaError::Extraction {
                reason: "document is not valid UTF-8".to_string(),
            })?;

        let pages: Vec<Page> = text
            .split('\u{0c}')
            .enumerate()
            .map(|(idx, part)| Page {
                number: idx as u32 + 1,
                text: part.to_string(),
            })
            .collect();

        Ok(ReaderOutput::new(ExtractedDocument { pages }, self.name()))
    }
}

/// True when `bytes` is a valid UTF-8 prefix (a trailing partial code point
/// does not disqualify a sniffed sample).
fn looks_like_utf8(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}
