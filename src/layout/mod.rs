//! Layout analysis over positioned text spans.
//!
//! This module turns a page's spans into table structure:
//! - span collection and preview text ([`spans`])
//! - row clustering and cell merging ([`rows`])
//! - header band detection and column anchors ([`header`])
//! - 1-D clustering helpers shared by the decoders ([`clustering`])

pub mod clustering;
pub mod header;
pub mod rows;
pub mod spans;

// Re-export main types
pub use clustering::{median, two_means, TwoMeans};
pub use header::{locate_header, ColumnBand, ColumnKind, HeaderLayout};
pub use rows::{build_rows, cluster_rows, merge_cells, Row};
pub use spans::{PageSpans, Token};
