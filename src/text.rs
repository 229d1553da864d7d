// Safe expect: patterns are hard-coded and compile-checked by tests.
#![allow(clippy::expect_used)]
//! Page-text normalization applied between extraction and chunking.
//!
//! `normalize_text` is a pure function; the transform order matters because
//! earlier removals change what later patterns match (removing a URL can turn
//! the rest of its line into a loose page number, whitespace collapse runs on
//! whatever the removals left behind).

use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)page\s+\d+(\s+of\s+\d+)?").expect("hard-coded pattern compiles")
});

static LOOSE_NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[ \t]*$").expect("hard-coded pattern compiles"));

static URL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("hard-coded pattern compiles"));

static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("hard-coded pattern compiles"));

static NEWLINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("hard-coded pattern compiles"));

/// Clean raw page text for chunking.
///
/// Transforms, in order:
/// 1. drop `page N` / `page N of M` boilerplate (case-insensitive);
/// 2. drop lines consisting solely of a number;
/// 3. drop URL-like tokens;
/// 4. collapse runs of spaces to one and 3+ newlines to exactly 2;
/// 5. drop characters outside printable ASCII (newline and tab survive so the
///    chunker still sees paragraph and line structure);
/// 6. trim.
pub fn normalize_text(raw: &str) -> String {
    let text = PAGE_LABEL.replace_all(raw, "");
    let text = LOOSE_NUMBER_LINE.replace_all(&text, "");
    let text = URL_TOKEN.replace_all(&text, "");
    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = NEWLINE_RUNS.replace_all(&text, "\n\n");
    let text: String = text
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || (' '..='~').contains(&c))
        .collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_page_boilerplate() {
        assert_eq!(
            normalize_text("Page 3 of 12\nRevenue grew in the quarter."),
            "Revenue grew in the quarter."
        );
        assert_eq!(normalize_text("see PAGE 7 for details"), "see for details");
    }

    #[test]
    fn removes_loose_number_lines() {
        let cleaned = normalize_text("Total revenue rose.\n42\nOperating costs fell.");
        assert_eq!(cleaned, "Total revenue rose.\n\nOperating costs fell.");
    }

    #[test]
    fn removes_urls() {
        assert_eq!(
            normalize_text("Details at https://example.com/ir/annual-report and beyond."),
            "Details at and beyond."
        );
    }

    #[test]
    fn collapses_spaces_and_newlines() {
        assert_eq!(normalize_text("a    b"), "a b");
        assert_eq!(normalize_text("first\n\n\n\n\nsecond"), "first\n\nsecond");
    }

    #[test]
    fn strips_non_printable_ascii_but_keeps_structure() {
        assert_eq!(normalize_text("caf\u{e9} results\u{7f}"), "caf results");
        let kept = normalize_text("one\ntwo\tthree");
        assert_eq!(kept, "one\ntwo\tthree");
    }

    #[test]
    fn boilerplate_only_page_normalizes_to_empty() {
        let raw = "Page 2\nhttps://example.com/report.pdf\n2\n";
        assert_eq!(normalize_text(raw), "");
    }

    #[test]
    fn idempotent_on_page_text() {
        let raw = "Page 1 of 9\n\n\nRevenue  grew 18%   year on year.\n7\nMore at https://ir.example.com/2024\nOutlook remains stable.";
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once);
    }
}
