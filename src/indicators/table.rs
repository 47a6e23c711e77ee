//! Column-aware decoding of rows below a detected table header.

use crate::indicators::lexicon::is_blacklisted;
use crate::indicators::parse::{
    clean_units, first_number, parse_comparator, parse_range, validate_name, Bound,
};
use crate::indicators::Candidate;
use crate::layout::header::{ColumnKind, HeaderLayout};
use crate::layout::rows::Row;
use crate::layout::spans::Token;

/// Cells of one row, split by column.
#[derive(Debug, Default)]
struct Buckets<'a> {
    name: Vec<&'a Token>,
    value: Vec<&'a Token>,
    units: Vec<&'a Token>,
    reference: Vec<&'a Token>,
}

fn join(tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reference bounds from the cells of a reference column.
///
/// A single cell holding a `min-max` range wins; otherwise the first two
/// numeric cells are taken as min and max. A lone comparator cell
/// (`"< 5.2"`) yields a one-sided bound.
pub(crate) fn reference_bounds(cells: &[&Token]) -> (Option<f64>, Option<f64>) {
    if let Some((min, max)) = cells.iter().find_map(|t| parse_range(&t.text)) {
        return (Some(min), Some(max));
    }

    let nums: Vec<f64> = cells.iter().filter_map(|t| first_number(&t.text)).collect();
    if nums.len() >= 2 {
        return (Some(nums[0]), Some(nums[1]));
    }

    match cells.iter().find_map(|t| parse_comparator(&t.text)) {
        Some(Bound::Max(max)) => (None, Some(max)),
        Some(Bound::Min(min)) => (Some(min), None),
        None => (None, None),
    }
}

/// Decode a single row against the header geometry.
///
/// Returns `None` for rows carrying administrative keywords, rows whose name
/// fails validation and rows without a numeric value.
pub fn decode_row(row: &Row, layout: &HeaderLayout) -> Option<Candidate> {
    let lower = row.lowercase_text();
    if is_blacklisted(&lower) {
        log::trace!("row rejected (blacklisted): {}", row.text());
        return None;
    }

    let mut buckets = Buckets::default();
    for cell in &row.cells {
        match layout.column_for(cell.center_x()) {
            ColumnKind::Name => buckets.name.push(cell),
            ColumnKind::Value => buckets.value.push(cell),
            ColumnKind::Units => buckets.units.push(cell),
            ColumnKind::Reference => buckets.reference.push(cell),
        }
    }

    let name = match validate_name(&join(&buckets.name)) {
        Ok(name) => name,
        Err(reason) => {
            log::trace!("row rejected ({:?}): {}", reason, row.text());
            return None;
        },
    };

    let Some(value) = buckets.value.iter().find_map(|t| first_number(&t.text)) else {
        log::trace!("row rejected (no value): {}", row.text());
        return None;
    };

    let mut candidate = Candidate::new(name).with_value(value);
    candidate.units = clean_units(&join(&buckets.units));
    let (ref_min, ref_max) = reference_bounds(&buckets.reference);
    candidate.ref_min = ref_min;
    candidate.ref_max = ref_max;

    Some(candidate)
}

/// Decode every row after the header row, in page order.
pub fn decode_rows(rows: &[Row], layout: &HeaderLayout) -> Vec<Candidate> {
    rows.iter()
        .skip(layout.header_row + 1)
        .filter_map(|row| decode_row(row, layout))
        .collect()
}
