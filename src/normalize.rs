//! Text normalization for extracted document text.
//!
//! Upstream extractors insert page-boundary marker lines of the form
//! `--- Page N ---` between pages. [`normalize`] collapses whitespace
//! runs inside each page segment to single spaces while preserving the
//! markers as explicit split points for the chunker, re-emitting them in
//! a canonical form. Normalization is idempotent: normalizing
//! already-normalized text yields identical text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{QaError, Result};

/// Normalized text shorter than this (markers excluded) signals that the
/// source document yielded no usable content.
pub const MIN_CONTENT_CHARS: usize = 10;

/// Matches a page-boundary marker as inserted by upstream extraction,
/// e.g. `--- Page 3 ---`. Tolerates longer dash runs.
static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-{3,}\s*Page\s+(\d+)\s*-{3,}").expect("page marker pattern is valid")
});

/// Normalize raw extracted text.
///
/// Collapses each whitespace run within a page segment to a single
/// space, drops empty segments, and joins the surviving segments with
/// canonical `--- Page N ---` marker lines (original page numbers
/// preserved). A marker is emitted only between two non-empty segments,
/// so leading and trailing markers disappear.
///
/// # Errors
///
/// Returns [`QaError::EmptyContent`] if the marker-stripped, trimmed
/// text is shorter than [`MIN_CONTENT_CHARS`].
pub fn normalize(raw: &str, document: &str) -> Result<String> {
    let mut segments: Vec<(Option<String>, String)> = Vec::new();
    let mut page: Option<String> = None;
    let mut last_end = 0;

    for caps in PAGE_MARKER.captures_iter(raw) {
        let marker = caps.get(0).expect("capture group 0 always exists");
        segments.push((page.take(), collapse_whitespace(&raw[last_end..marker.start()])));
        page = Some(caps[1].to_string());
        last_end = marker.end();
    }
    segments.push((page, collapse_whitespace(&raw[last_end..])));

    let content_chars: usize = segments.iter().map(|(_, s)| s.chars().count()).sum();
    if content_chars < MIN_CONTENT_CHARS {
        return Err(QaError::EmptyContent { document: document.to_string() });
    }

    let mut out = String::new();
    for (page, segment) in segments {
        if segment.is_empty() {
            continue;
        }
        match (out.is_empty(), page) {
            (true, _) => out.push_str(&segment),
            (false, Some(n)) => {
                out.push_str(&format!("\n--- Page {n} ---\n"));
                out.push_str(&segment);
            }
            // Only the first segment lacks a preceding marker.
            (false, None) => {
                out.push(' ');
                out.push_str(&segment);
            }
        }
    }

    Ok(out)
}

/// Split normalized text into page sections at marker lines.
///
/// Sections correspond to the original pages; the chunker processes them
/// independently so sentences never merge across page boundaries.
pub fn split_pages(text: &str) -> Vec<&str> {
    PAGE_MARKER.split(text).collect()
}

/// Collapse every whitespace run to a single space and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        let normalized = normalize("several   words\t with \n\n odd   spacing", "doc").unwrap();
        assert_eq!(normalized, "several words with odd spacing");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = "first   page text here\n\n--- Page 2 ---\n second  page\ttext";
        let once = normalize(raw, "doc").unwrap();
        let twice = normalize(&once, "doc").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_page_markers_as_split_points() {
        let raw = "intro  text on page one\n---- Page 2 ----\n  second  page body ";
        let normalized = normalize(raw, "doc").unwrap();
        assert_eq!(normalized, "intro text on page one\n--- Page 2 ---\nsecond page body");
        let sections = split_pages(&normalized);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].trim(), "intro text on page one");
        assert_eq!(sections[1].trim(), "second page body");
    }

    #[test]
    fn drops_pages_with_no_text() {
        let raw = "--- Page 1 ---\n   \n--- Page 2 ---\nthe only page with real content";
        let normalized = normalize(raw, "doc").unwrap();
        assert_eq!(normalized, "the only page with real content");
    }

    #[test]
    fn rejects_whitespace_only_text() {
        let err = normalize("   \n\t ", "empty.txt").unwrap_err();
        assert!(matches!(err, QaError::EmptyContent { document } if document == "empty.txt"));
    }

    #[test]
    fn rejects_text_below_minimum_length() {
        let err = normalize("--- Page 1 ---\n  hi  ", "short.pdf").unwrap_err();
        assert!(matches!(err, QaError::EmptyContent { .. }));
    }
}
