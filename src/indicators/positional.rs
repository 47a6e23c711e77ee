//! Header-less table decoding from numeric column positions.
//!
//! When no trustworthy header exists, the left edges of all numeric cells on
//! the page are split into two bands with [`two_means`]: the lower-x band is
//! taken as the value column and the higher-x band as the reference column.
//! Rows are then decoded around the numeric cell nearest the value band.

use crate::indicators::lexicon::is_blacklisted;
use crate::indicators::parse::{
    clean_units, first_number, is_strict_number, is_strict_range, parse_comparator, parse_number,
    parse_range, validate_name,
};
use crate::indicators::Candidate;
use crate::layout::clustering::two_means;
use crate::layout::rows::Row;
use crate::layout::spans::Token;

/// Default minimum count of numeric cells needed to trust the two-band split.
pub const DEFAULT_MIN_NUMERIC: usize = 6;

/// Default number of two-means iterations.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Default horizontal tolerance around the reference band.
pub const DEFAULT_REFERENCE_TOLERANCE: f32 = 30.0;

/// Column centers recovered from numeric cell positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericColumns {
    /// Center of the value band
    pub value_center: f32,
    /// Center of the reference band
    pub ref_center: f32,
}

fn is_numeric_cell(token: &Token) -> bool {
    is_strict_number(&token.text) || is_strict_range(&token.text)
}

/// Split the page's numeric cells into value and reference bands.
///
/// Returns `None` when fewer than `min_numeric` numeric cells exist.
pub fn detect_columns(rows: &[Row], min_numeric: usize, iterations: usize) -> Option<NumericColumns> {
    let xs: Vec<f32> = rows
        .iter()
        .flat_map(|r| r.cells.iter())
        .filter(|t| is_numeric_cell(t))
        .map(|t| t.bbox.x0)
        .collect();

    if xs.len() < min_numeric {
        log::debug!(
            "positional fallback skipped: {} numeric cell(s), need {}",
            xs.len(),
            min_numeric
        );
        return None;
    }

    let centers = two_means(&xs, iterations)?;
    Some(NumericColumns {
        value_center: centers.low,
        ref_center: centers.high,
    })
}

/// Decode one row around its value cell.
pub fn decode_row(row: &Row, columns: &NumericColumns, ref_tolerance: f32) -> Option<Candidate> {
    if is_blacklisted(&row.lowercase_text()) {
        log::trace!("row rejected (blacklisted): {}", row.text());
        return None;
    }

    let value_distance = |t: &Token| (t.bbox.x0 - columns.value_center).abs();
    let ref_distance = |t: &Token| (t.bbox.x0 - columns.ref_center).abs();

    let (value_idx, value_cell) = row
        .cells
        .iter()
        .enumerate()
        .filter(|(_, t)| is_strict_number(&t.text))
        .min_by(|(_, a), (_, b)| value_distance(*a).total_cmp(&value_distance(*b)))?;

    if ref_distance(value_cell) < value_distance(value_cell) {
        log::trace!("row rejected (reference-only): {}", row.text());
        return None;
    }

    let name_cells: Vec<&str> = row.cells[..value_idx]
        .iter()
        .map(|t| t.text.as_str())
        .collect();
    let name = match validate_name(&name_cells.join(" ")) {
        Ok(name) => name,
        Err(reason) => {
            log::trace!("row rejected ({:?}): {}", reason, row.text());
            return None;
        },
    };

    let value = parse_number(&value_cell.text)?;
    let mut candidate = Candidate::new(name).with_value(value);

    let trailing = &row.cells[value_idx + 1..];

    candidate.units = trailing
        .iter()
        .filter(|t| t.center_x() < columns.ref_center && !is_numeric_cell(t))
        .find_map(|t| clean_units(&t.text));

    if let Some((min, max)) = trailing
        .iter()
        .filter(|t| is_strict_range(&t.text))
        .find_map(|t| parse_range(&t.text))
    {
        candidate.ref_min = Some(min);
        candidate.ref_max = Some(max);
    } else {
        let near_ref: Vec<&Token> = trailing
            .iter()
            .filter(|t| (t.bbox.x0 - columns.ref_center).abs() <= ref_tolerance)
            .collect();
        let nums: Vec<f64> = near_ref
            .iter()
            .filter(|t| is_strict_number(&t.text))
            .filter_map(|t| first_number(&t.text))
            .collect();
        if nums.len() >= 2 {
            candidate.ref_min = Some(nums[0]);
            candidate.ref_max = Some(nums[1]);
        } else if let Some(bound) = near_ref.iter().find_map(|t| parse_comparator(&t.text)) {
            candidate.apply_bound(bound);
        }
    }

    Some(candidate)
}

/// Decode every row of a header-less page.
pub fn decode_rows(
    rows: &[Row],
    min_numeric: usize,
    iterations: usize,
    ref_tolerance: f32,
) -> Vec<Candidate> {
    let Some(columns) = detect_columns(rows, min_numeric, iterations) else {
        return Vec::new();
    };
    log::debug!(
        "positional columns: value={:.1} reference={:.1}",
        columns.value_center,
        columns.ref_center
    );

    rows.iter()
        .filter_map(|row| decode_row(row, &columns, ref_tolerance))
        .collect()
}
