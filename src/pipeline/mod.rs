//! Extraction pipeline: from page spans or OCR text to classified indicators.
//!
//! ```text
//! PageSpans[] ──► collect_tokens ──► build_rows ──► locate_header
//!                                                     │
//!                                  header ◄───────────┴──────────► no header
//!                                    │                                 │
//!                            table::decode_rows            positional::decode_rows
//!                                    └──────────────┬──────────────────┘
//!                                                   ▼
//!                                      structural candidates
//!                                                   │  fewer than min_structural_candidates?
//!                                                   ▼
//!                       OCR text (or direct page text) ──► text::decode_text
//!                                                   │
//!                                                   ▼
//!                                    merge_candidates ──► finalize
//! ```
//!
//! Images skip the structural half and go straight to the text decoder.
//! Nothing here fails: pages that cannot be decoded contribute no candidates.

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::indicators::merge::dedup_first;
use crate::indicators::{
    finalize, merge_candidates, positional, table, text, Candidate, Indicator,
};
use crate::layout::header::locate_header;
use crate::layout::rows::{build_rows, Row};
use crate::layout::spans::{
    collect_ocr_text, collect_tokens, select_pages, truncate_preview, PageSpans,
};
use serde::Serialize;

/// Kind of uploaded document, which decides the decoding paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Raster image: OCR text only
    Image,
    /// PDF: layout spans first, OCR text as fallback
    Pdf,
}

impl DocumentKind {
    /// Route a MIME content type.
    ///
    /// # Examples
    ///
    /// ```
    /// use lab_oxide::pipeline::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::from_content_type("image/png").unwrap(), DocumentKind::Image);
    /// assert_eq!(DocumentKind::from_content_type("application/pdf").unwrap(), DocumentKind::Pdf);
    /// assert!(DocumentKind::from_content_type("text/html").is_err());
    /// ```
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if mime.starts_with("image/") {
            Ok(DocumentKind::Image)
        } else if mime == "application/pdf" || mime.ends_with("+pdf") {
            Ok(DocumentKind::Pdf)
        } else {
            Err(Error::UnsupportedDocument(content_type.to_string()))
        }
    }
}

/// How a page's rows were decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePath {
    /// Rows decoded against a detected header
    Table,
    /// Rows decoded against recovered numeric columns
    Positional,
}

/// Per-page decoding summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    /// Page index as given by the layout reader
    pub page_index: usize,
    /// Decoder used for the page
    pub path: PagePath,
    /// Rows built from the page's tokens
    pub rows: usize,
    /// Candidates the page produced
    pub candidates: usize,
}

/// Result of one document's extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Classified indicators, in encounter order
    pub indicators: Vec<Indicator>,
    /// Text the indicators were read from, capped for storage
    pub source_text: String,
    /// Structural decoding summary, one entry per selected PDF page
    pub pages: Vec<PageReport>,
    /// Whether the OCR-text decoder ran
    pub used_text_path: bool,
}

impl Extraction {
    /// Whether no indicator was extracted.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Indicators outside their reference range.
    pub fn flagged(&self) -> impl Iterator<Item = &Indicator> {
        crate::indicators::deviation::flagged(&self.indicators)
    }
}

/// Structural candidates of a PDF together with its direct text.
#[derive(Debug, Default)]
struct StructuralPass {
    /// Candidates from every selected page, first mention wins
    candidates: Vec<Candidate>,
    /// Direct text of the selected pages
    text: String,
    pages: Vec<PageReport>,
}

/// Indicator extraction engine.
///
/// The extractor holds only configuration; it is cheap to clone and safe to
/// share between threads.
///
/// # Example
///
/// ```
/// use lab_oxide::pipeline::IndicatorExtractor;
///
/// let extractor = IndicatorExtractor::new();
/// let result = extractor.extract_image("Глюкоза 5.6 ммоль/л 3.9-5.5");
/// assert_eq!(result.indicators.len(), 1);
/// assert_eq!(result.indicators[0].value, Some(5.6));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndicatorExtractor {
    config: ExtractionConfig,
}

impl IndicatorExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    /// Create an extractor with custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Decode the rows of one page, preferring a detected header.
    pub fn decode_rows(&self, rows: &[Row]) -> (PagePath, Vec<Candidate>) {
        let cfg = &self.config;
        match locate_header(
            rows,
            cfg.header_band_tolerance,
            cfg.effective_min_header_kinds(),
        ) {
            Some(layout) => {
                log::debug!(
                    "header on row {}: value={:.1} units={:.1} reference={:.1}",
                    layout.header_row,
                    layout.value_x,
                    layout.units_x,
                    layout.reference_x
                );
                (PagePath::Table, table::decode_rows(rows, &layout))
            },
            None => {
                log::debug!("no header found, using positional columns");
                let candidates = positional::decode_rows(
                    rows,
                    cfg.fallback_min_numeric,
                    cfg.two_means_iterations,
                    cfg.reference_band_tolerance,
                );
                (PagePath::Positional, candidates)
            },
        }
    }

    /// Run the structural path over the selected pages.
    fn extract_structural(&self, pages: &[PageSpans]) -> StructuralPass {
        let mut pass = StructuralPass::default();
        let mut texts = Vec::new();

        for page in select_pages(pages, self.config.max_pages) {
            let tokens = collect_tokens(page);
            let rows = build_rows(&tokens, self.config.row_tolerance, self.config.cell_merge_gap);
            let (path, candidates) = self.decode_rows(&rows);

            log::debug!(
                "page {}: {} token(s), {} row(s), {} candidate(s) via {:?}",
                page.page_index,
                tokens.len(),
                rows.len(),
                candidates.len(),
                path
            );

            texts.push(match &page.text {
                Some(text) => text.clone(),
                None => rows.iter().map(Row::text).collect::<Vec<_>>().join("\n"),
            });
            pass.pages.push(PageReport {
                page_index: page.page_index,
                path,
                rows: rows.len(),
                candidates: candidates.len(),
            });
            pass.candidates.extend(candidates);
        }

        pass.candidates = dedup_first(pass.candidates);
        pass.text = texts.join("\n");
        pass
    }

    /// Decode a block of OCR or page text.
    ///
    /// `existing` holds candidates already found in the same document; known
    /// tests among them are not reported again under their catalog name.
    pub fn extract_text(&self, text: &str, existing: &[Candidate]) -> Vec<Candidate> {
        text::decode_text(text, self.config.detect_known_tests, existing)
    }

    /// Extract indicators from an image's OCR transcript.
    pub fn extract_image(&self, ocr_text: &str) -> Extraction {
        let candidates = self.extract_text(ocr_text, &[]);
        log::debug!("image: {} candidate(s) from OCR text", candidates.len());
        Extraction {
            indicators: finalize(candidates),
            source_text: truncate_preview(ocr_text, self.config.preview_char_budget),
            pages: Vec::new(),
            used_text_path: true,
        }
    }

    /// Extract indicators from a PDF.
    ///
    /// The structural path runs first. When it yields fewer than
    /// `min_structural_candidates`, the OCR transcript (or, without one, the
    /// direct page text) is decoded as well and the two lists are merged, the
    /// longer list taking precedence on ties.
    pub fn extract_pdf<S: AsRef<str>>(
        &self,
        pages: &[PageSpans],
        ocr_pages: Option<&[S]>,
    ) -> Extraction {
        let structural = self.extract_structural(pages);

        if structural.candidates.len() >= self.config.min_structural_candidates {
            return Extraction {
                indicators: finalize(structural.candidates),
                source_text: truncate_preview(&structural.text, self.config.preview_char_budget),
                pages: structural.pages,
                used_text_path: false,
            };
        }

        let ocr_text = ocr_pages
            .map(|p| collect_ocr_text(p, self.config.max_pages))
            .filter(|t| !t.trim().is_empty());
        let source = ocr_text.unwrap_or_else(|| structural.text.clone());
        let from_text = self.extract_text(&source, &structural.candidates);

        log::debug!(
            "structural pass: {} candidate(s), text pass: {}",
            structural.candidates.len(),
            from_text.len()
        );

        let merged = if from_text.len() > structural.candidates.len() {
            merge_candidates(from_text, structural.candidates)
        } else {
            merge_candidates(structural.candidates, from_text)
        };

        Extraction {
            indicators: finalize(merged),
            source_text: truncate_preview(&source, self.config.preview_char_budget),
            pages: structural.pages,
            used_text_path: true,
        }
    }

    /// Extract indicators from a document of the given kind.
    ///
    /// Images use `ocr_pages` only; `pages` is ignored for them.
    pub fn extract<S: AsRef<str>>(
        &self,
        kind: DocumentKind,
        pages: &[PageSpans],
        ocr_pages: Option<&[S]>,
    ) -> Extraction {
        match kind {
            DocumentKind::Image => {
                let text = ocr_pages
                    .map(|p| collect_ocr_text(p, self.config.max_pages))
                    .unwrap_or_default();
                self.extract_image(&text)
            },
            DocumentKind::Pdf => self.extract_pdf(pages, ocr_pages),
        }
    }
}
