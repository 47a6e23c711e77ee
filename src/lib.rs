
//! # Lab Oxide
//!
//! Extraction of laboratory indicators (test name, value, units, reference
//! range) from medical lab reports, with a low/normal/high deviation flag.
//!
//! ## Inputs
//!
//! The engine never touches files or renders pages. It consumes:
//! - **Layout spans**: per-page text spans with bounding boxes, as produced
//!   by an external PDF layout reader ([`layout::spans::PageSpans`])
//! - **OCR text**: one plain-text transcript per page or image
//!
//! ## Decoding paths
//!
//! - **Table**: rows are clustered by vertical position, a header band is
//!   located by column keywords, and every row below it is split into
//!   name/value/units/reference columns by x position
//! - **Positional**: without a header, numeric cell positions are split into
//!   a value and a reference column with a 1-D two-means routine
//! - **Text**: OCR or direct page text is decoded line by line, with a small
//!   catalog of well-known tests as a safety net
//!
//! Results of the structural and text paths are merged by normalized test
//! name, keeping the more complete record, and classified against their
//! reference range.
//!
//! ## Quick Start
//!
//! ```
//! use lab_oxide::layout::spans::{PageSpans, Token};
//! use lab_oxide::pipeline::IndicatorExtractor;
//! use lab_oxide::indicators::Deviation;
//!
//! let page = PageSpans::new(
//!     0,
//!     vec![
//!         Token::new("Test", 10.0, 50.0, 40.0, 60.0),
//!         Token::new("Value", 120.0, 50.0, 150.0, 60.0),
//!         Token::new("Reference", 220.0, 50.0, 270.0, 60.0),
//!         Token::new("Glucose", 10.0, 70.0, 50.0, 80.0),
//!         Token::new("5.6", 120.0, 70.0, 135.0, 80.0),
//!         Token::new("3.9-5.5", 220.0, 70.0, 255.0, 80.0),
//!     ],
//! );
//!
//! let result = IndicatorExtractor::new().extract_pdf::<String>(&[page], None);
//! assert_eq!(result.indicators[0].test_name, "Glucose");
//! assert_eq!(result.indicators[0].deviation, Deviation::High);
//! ```
//!
//! ## Logging
//!
//! The library logs through the `log` facade: page decisions at `debug`,
//! rejected rows and lines at `trace`, dropped malformed spans at `warn`.
//! Installing a logger is left to the binary.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Geometry and layout analysis
pub mod geometry;
pub mod layout;

// Indicator decoding
pub mod indicators;
pub mod reference;

// Configuration
pub mod config;

// Pipeline orchestration
pub mod pipeline;

// Re-exports
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use indicators::{Candidate, Deviation, Indicator};
pub use pipeline::{DocumentKind, Extraction, IndicatorExtractor};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
