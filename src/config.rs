//! Configuration for indicator extraction.

use crate::error::{Error, Result};
use crate::indicators::positional::{
    DEFAULT_ITERATIONS, DEFAULT_MIN_NUMERIC, DEFAULT_REFERENCE_TOLERANCE,
};
use crate::layout::header::{DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS};
use crate::layout::rows::{DEFAULT_CELL_MERGE_GAP, DEFAULT_ROW_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Default page cap.
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Default character budget of the stored preview text.
pub const DEFAULT_PREVIEW_CHAR_BUDGET: usize = 20_000;

/// Extraction configuration.
///
/// Geometric tolerances are in page units. Every field has a default, so a
/// JSON document only needs to name the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Pages considered per document, for both the span and OCR paths.
    pub max_pages: usize,

    /// Structural candidate count below which OCR text is decoded as well.
    pub min_structural_candidates: usize,

    /// Vertical distance from a row's mean center that still joins the row.
    pub row_tolerance: f32,

    /// Largest horizontal gap between tokens merged into one cell.
    pub cell_merge_gap: f32,

    /// Vertical tolerance when grouping header keywords into bands.
    pub header_band_tolerance: f32,

    /// Distinct column kinds a header band needs. Values below 3 are raised to 3.
    pub min_header_kinds: usize,

    /// Numeric cells needed before header-less column recovery is attempted.
    pub fallback_min_numeric: usize,

    /// Two-means iterations for header-less column recovery.
    pub two_means_iterations: usize,

    /// Horizontal tolerance around the recovered reference column.
    pub reference_band_tolerance: f32,

    /// Characters kept in the preview text.
    pub preview_char_budget: usize,

    /// Recognise well-known tests mentioned anywhere in OCR text.
    pub detect_known_tests: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            min_structural_candidates: 1,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            cell_merge_gap: DEFAULT_CELL_MERGE_GAP,
            header_band_tolerance: DEFAULT_HEADER_BAND_TOLERANCE,
            min_header_kinds: MIN_HEADER_KINDS,
            fallback_min_numeric: DEFAULT_MIN_NUMERIC,
            two_means_iterations: DEFAULT_ITERATIONS,
            reference_band_tolerance: DEFAULT_REFERENCE_TOLERANCE,
            preview_char_budget: DEFAULT_PREVIEW_CHAR_BUDGET,
            detect_known_tests: true,
        }
    }

    /// Load a configuration from JSON and validate it.
    ///
    /// # Examples
    ///
    /// ```
    /// use lab_oxide::config::ExtractionConfig;
    ///
    /// let config = ExtractionConfig::from_json_str(r#"{"max_pages": 2}"#).unwrap();
    /// assert_eq!(config.max_pages, 2);
    /// assert_eq!(config.row_tolerance, 2.8);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tunable is usable.
    pub fn validate(&self) -> Result<()> {
        let tolerances = [
            ("row_tolerance", self.row_tolerance),
            ("cell_merge_gap", self.cell_merge_gap),
            ("header_band_tolerance", self.header_band_tolerance),
            ("reference_band_tolerance", self.reference_band_tolerance),
        ];
        for (field, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    field,
                    value: value.to_string(),
                });
            }
        }

        let counts = [
            ("max_pages", self.max_pages),
            ("fallback_min_numeric", self.fallback_min_numeric),
            ("two_means_iterations", self.two_means_iterations),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(Error::InvalidConfig {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Header kind threshold actually applied.
    pub fn effective_min_header_kinds(&self) -> usize {
        self.min_header_kinds.max(MIN_HEADER_KINDS)
    }

    /// Set the page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the structural candidate count that triggers the OCR path.
    pub fn with_min_structural_candidates(mut self, count: usize) -> Self {
        self.min_structural_candidates = count;
        self
    }

    /// Set the row clustering tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the cell merge gap.
    pub fn with_cell_merge_gap(mut self, gap: f32) -> Self {
        self.cell_merge_gap = gap;
        self
    }

    /// Set the header band tolerance.
    pub fn with_header_band_tolerance(mut self, tolerance: f32) -> Self {
        self.header_band_tolerance = tolerance;
        self
    }

    /// Set the preview character budget.
    pub fn with_preview_char_budget(mut self, budget: usize) -> Self {
        self.preview_char_budget = budget;
        self
    }

    /// Enable or disable the well-known test detectors.
    pub fn with_known_tests(mut self, enable: bool) -> Self {
        self.detect_known_tests = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.min_structural_candidates, 1);
        assert_eq!(config.row_tolerance, 2.8);
        assert_eq!(config.cell_merge_gap, 6.0);
        assert_eq!(config.header_band_tolerance, 4.5);
        assert_eq!(config.fallback_min_numeric, 6);
        assert_eq!(config.two_means_iterations, 10);
        assert!(config.detect_known_tests);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ExtractionConfig::new()
            .with_max_pages(2)
            .with_row_tolerance(3.5)
            .with_known_tests(false);
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.row_tolerance, 3.5);
        assert!(!config.detect_known_tests);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ExtractionConfig::from_json_str(r#"{"cell_merge_gap": 4.0, "detect_known_tests": false}"#)
                .unwrap();
        assert_eq!(config.cell_merge_gap, 4.0);
        assert!(!config.detect_known_tests);
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = ExtractionConfig::new()
            .with_row_tolerance(f32::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "row_tolerance",
                ..
            }
        ));

        let err = ExtractionConfig::from_json_str(r#"{"max_pages": 0}"#).unwrap_err();
        assert!(err.to_string().contains("max_pages"));

        assert!(matches!(
            ExtractionConfig::from_json_str("{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_min_header_kinds_never_below_three() {
        let mut config = ExtractionConfig::new();
        config.min_header_kinds = 2;
        assert_eq!(config.effective_min_header_kinds(), 3);
        config.min_header_kinds = 4;
        assert_eq!(config.effective_min_header_kinds(), 4);
    }
}
