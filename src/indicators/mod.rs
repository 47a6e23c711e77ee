//! Indicator decoding: from rows and text lines to lab measurements.
//!
//! Three decoders produce [`Candidate`] lists:
//! - [`table`]: rows below a detected header, assigned to columns by x position
//! - [`positional`]: header-less pages, columns recovered by two-means clustering
//! - [`text`]: flat OCR or page text, decoded line by line
//!
//! [`merge`] reconciles two candidate lists and [`deviation`] turns the
//! survivors into final [`Indicator`]s.

pub mod deviation;
pub mod lexicon;
pub mod merge;
pub mod parse;
pub mod positional;
pub mod table;
pub mod text;

pub use deviation::{classify, Deviation};
pub use merge::{merge_candidates, merge_key};

use crate::indicators::parse::Bound;
use serde::{Deserialize, Serialize};

/// An extracted lab measurement that has not been classified yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Indicator name as printed in the document
    pub test_name: String,
    /// Measured value
    pub value: Option<f64>,
    /// Measurement units
    pub units: Option<String>,
    /// Lower reference bound
    pub ref_min: Option<f64>,
    /// Upper reference bound
    pub ref_max: Option<f64>,
    /// Free-form note attached to the measurement
    pub comment: Option<String>,
}

impl Candidate {
    /// Create a candidate with only a name.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            value: None,
            units: None,
            ref_min: None,
            ref_max: None,
            comment: None,
        }
    }

    /// Set the measured value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the units.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Set both reference bounds.
    pub fn with_range(mut self, ref_min: f64, ref_max: f64) -> Self {
        self.ref_min = Some(ref_min);
        self.ref_max = Some(ref_max);
        self
    }

    /// Set a note.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Apply a one-sided reference bound.
    pub fn apply_bound(&mut self, bound: Bound) {
        match bound {
            Bound::Max(v) => self.ref_max = Some(v),
            Bound::Min(v) => self.ref_min = Some(v),
        }
    }

    /// Whether at least one reference bound is known.
    pub fn has_reference(&self) -> bool {
        self.ref_min.is_some() || self.ref_max.is_some()
    }
}

/// A classified lab measurement, the engine's final output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Indicator name
    pub test_name: String,
    /// Measured value
    pub value: Option<f64>,
    /// Measurement units
    pub units: Option<String>,
    /// Lower reference bound
    pub ref_min: Option<f64>,
    /// Upper reference bound
    pub ref_max: Option<f64>,
    /// Free-form note
    pub comment: Option<String>,
    /// Position of the value relative to the reference range
    pub deviation: Deviation,
}

impl From<Candidate> for Indicator {
    fn from(candidate: Candidate) -> Self {
        let deviation = classify(candidate.value, candidate.ref_min, candidate.ref_max);
        Self {
            test_name: candidate.test_name,
            value: candidate.value,
            units: candidate.units,
            ref_min: candidate.ref_min,
            ref_max: candidate.ref_max,
            comment: candidate.comment,
            deviation,
        }
    }
}

/// Classify every candidate, preserving order.
pub fn finalize(candidates: Vec<Candidate>) -> Vec<Indicator> {
    candidates.into_iter().map(Indicator::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_builders() {
        let c = Candidate::new("ALT")
            .with_value(42.0)
            .with_units("U/L")
            .with_range(0.0, 40.0);
        assert_eq!(c.value, Some(42.0));
        assert_eq!(c.units.as_deref(), Some("U/L"));
        assert!(c.has_reference());
        assert!(c.comment.is_none());
    }

    #[test]
    fn test_apply_bound() {
        let mut c = Candidate::new("Cholesterol").with_value(190.0);
        assert!(!c.has_reference());
        c.apply_bound(Bound::Max(200.0));
        assert_eq!(c.ref_max, Some(200.0));
        assert_eq!(c.ref_min, None);
        c.apply_bound(Bound::Min(1.0));
        assert_eq!(c.ref_min, Some(1.0));
    }

    #[test]
    fn test_indicator_from_candidate() {
        let high = Indicator::from(Candidate::new("ALT").with_value(42.0).with_range(0.0, 40.0));
        assert_eq!(high.deviation, Deviation::High);
        assert_eq!(high.test_name, "ALT");

        let unknown = Indicator::from(Candidate::new("ALT").with_value(42.0));
        assert_eq!(unknown.deviation, Deviation::Unknown);
    }

    #[test]
    fn test_indicator_serializes_lowercase_deviation() {
        let ind = Indicator::from(Candidate::new("Glucose").with_value(5.0).with_range(3.9, 5.5));
        let json = serde_json::to_value(&ind).unwrap();
        assert_eq!(json["deviation"], "normal");
        assert_eq!(json["test_name"], "Glucose");
    }
}
