//! Span collection: the entry point for positioned page text.
//!
//! An external layout reader supplies, per page, the text spans it found
//! together with their bounding boxes. This module turns those pages into
//! clean [`Token`] lists, and builds the capped preview text that callers
//! store next to the document for auditing.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Marker appended to preview text that was cut at the character budget.
pub const TRUNCATION_MARKER: &str = "\n…[truncated]";

/// A single span of glyphs with its bounding box on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Span text as reported by the layout reader
    pub text: String,
    /// Bounding box in page coordinates
    #[serde(flatten)]
    pub bbox: Rect,
    /// Position of the span in the reader's output.
    ///
    /// Used as the final tie-breaker when sorting, so clustering stays
    /// deterministic for spans that share coordinates.
    #[serde(skip)]
    pub sequence: usize,
}

impl Token {
    /// Create a token from its text and corner coordinates.
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Rect::new(x0, y0, x1, y1),
            sequence: 0,
        }
    }

    /// Same token with an explicit sequence number.
    pub fn with_sequence(mut self, sequence: usize) -> Self {
        self.sequence = sequence;
        self
    }

    /// Vertical center of the token.
    pub fn center_y(&self) -> f32 {
        self.bbox.center_y()
    }

    /// Horizontal center of the token.
    pub fn center_x(&self) -> f32 {
        self.bbox.center_x()
    }
}

/// All spans found on one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSpans {
    /// Zero-based page index
    pub page_index: usize,
    /// Spans in reader order
    #[serde(default)]
    pub spans: Vec<Token>,
    /// Direct page text, when the reader provides it
    #[serde(default)]
    pub text: Option<String>,
}

impl PageSpans {
    /// Create a page from its spans.
    pub fn new(page_index: usize, spans: Vec<Token>) -> Self {
        Self {
            page_index,
            spans,
            text: None,
        }
    }

    /// Attach the reader's direct page text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Text of the page: the reader's direct text, or the spans joined
    /// in reader order when none was supplied.
    pub fn page_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self
                .spans
                .iter()
                .map(|s| s.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Select the pages eligible for extraction, in page order, capped at `max_pages`.
pub fn select_pages(pages: &[PageSpans], max_pages: usize) -> Vec<&PageSpans> {
    let mut selected: Vec<&PageSpans> = pages.iter().collect();
    selected.sort_by_key(|p| p.page_index);
    selected.truncate(max_pages);
    selected
}

/// Produce the token stream for one page.
///
/// Spans with blank text or non-finite coordinates are dropped. Every
/// surviving token is stamped with its reader position as sequence number.
pub fn collect_tokens(page: &PageSpans) -> Vec<Token> {
    let mut dropped = 0usize;
    let tokens: Vec<Token> = page
        .spans
        .iter()
        .enumerate()
        .filter_map(|(idx, span)| {
            let text = span.text.trim();
            if text.is_empty() {
                return None;
            }
            if !span.bbox.is_finite() {
                dropped += 1;
                return None;
            }
            Some(Token {
                text: text.to_string(),
                bbox: span.bbox,
                sequence: idx,
            })
        })
        .collect();

    if dropped > 0 {
        log::warn!(
            "page {}: dropped {} span(s) with non-finite coordinates",
            page.page_index,
            dropped
        );
    }

    tokens
}

/// Join per-page OCR transcripts, honoring the page cap.
pub fn collect_ocr_text<S: AsRef<str>>(pages: &[S], max_pages: usize) -> String {
    pages
        .iter()
        .take(max_pages)
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cap `text` at `budget` characters, appending [`TRUNCATION_MARKER`] when cut.
///
/// # Examples
///
/// ```
/// use lab_oxide::layout::spans::{truncate_preview, TRUNCATION_MARKER};
///
/// assert_eq!(truncate_preview("short", 10), "short");
/// assert_eq!(truncate_preview("abcdef", 3), format!("abc{}", TRUNCATION_MARKER));
/// ```
pub fn truncate_preview(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Parse a JSON dump of pages as produced by the layout reader.
///
/// The expected shape is an array of `{page_index, spans: [{text, x0, y0, x1, y1}], text?}`.
pub fn parse_pages_json(json: &str) -> Result<Vec<PageSpans>> {
    let pages: Vec<PageSpans> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for page in &pages {
        if !seen.insert(page.page_index) {
            return Err(Error::InvalidSpans(format!(
                "page {} appears more than once",
                page.page_index
            )));
        }
    }

    Ok(pages)
}
