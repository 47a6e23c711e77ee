//! Catalog of well-known tests with fixed units and reference ranges.
//!
//! The OCR-text decoder uses these entries as a safety net: a document that
//! mentions glucose or cholesterol by name with a value but without any
//! recognisable table still yields a measurement.

use crate::indicators::merge_key;

/// A well-known test with a fixed reference range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    /// Canonical test name
    pub name: &'static str,
    /// Lowercase spellings that denote the same test
    pub aliases: &'static [&'static str],
    /// Case-insensitive pattern capturing the value as group 1
    pub pattern: &'static str,
    /// Units the reference range is expressed in
    pub units: &'static str,
    /// Lower reference bound
    pub ref_min: f64,
    /// Upper reference bound
    pub ref_max: f64,
}

impl ReferenceRange {
    /// Whether `name` denotes this test.
    pub fn matches(&self, name: &str) -> bool {
        let key = merge_key(name);
        key == self.name.to_lowercase() || self.aliases.iter().any(|a| *a == key)
    }
}

/// Tests recognised by name anywhere in a text.
pub const KNOWN_TESTS: &[ReferenceRange] = &[
    ReferenceRange {
        name: "Glucose",
        aliases: &["glucose", "глюкоза", "глюкозы", "глюкоза крови", "glucose, serum"],
        pattern: r"(?i)(?:glucose|глюкоз[аы])\s*[:\-]?\s*(\d+(?:[.,]\d+)?)",
        units: "mmol/L",
        ref_min: 3.9,
        ref_max: 5.5,
    },
    ReferenceRange {
        name: "Cholesterol",
        aliases: &["cholesterol", "холестерин", "холестерин общий", "total cholesterol"],
        pattern: r"(?i)(?:cholesterol|холестерин)\s*[:\-]?\s*(\d+(?:[.,]\d+)?)",
        units: "mg/dL",
        ref_min: 0.0,
        ref_max: 200.0,
    },
];

/// Catalog entry for `name`, matched case-insensitively against names and aliases.
///
/// # Examples
///
/// ```
/// use lab_oxide::reference::lookup;
///
/// assert_eq!(lookup("Глюкоза").map(|r| r.name), Some("Glucose"));
/// assert_eq!(lookup("  CHOLESTEROL ").map(|r| r.ref_max), Some(200.0));
/// assert!(lookup("ALT").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static ReferenceRange> {
    KNOWN_TESTS.iter().find(|r| r.matches(name))
}
