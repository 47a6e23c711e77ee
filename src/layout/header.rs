//! Table header detection and column geometry.
//!
//! Header captions ("Исследование", "Результат", "Ед. изм.", "Референсные
//! значения", ...) are found cell by cell, grouped into horizontal bands by
//! their vertical position, and the band that names the most distinct column
//! kinds becomes the header. Its captions give the x anchors that every row
//! below it is decoded against.

use crate::indicators::lexicon::header_kind;
use crate::layout::clustering::median;
use crate::layout::rows::Row;
use crate::utils::safe_float_cmp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default vertical tolerance when grouping header captions into bands.
pub const DEFAULT_HEADER_BAND_TOLERANCE: f32 = 4.5;

/// Fewest distinct column kinds a band needs before it is trusted as a header.
pub const MIN_HEADER_KINDS: usize = 3;

/// The four columns of a lab results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Test / indicator name
    Name,
    /// Measured value
    Value,
    /// Measurement units
    Units,
    /// Reference range
    Reference,
}

/// One detected header column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBand {
    /// Column kind
    pub kind: ColumnKind,
    /// Anchor: median horizontal center of the column's captions
    pub x_center: f32,
    /// Right edge of the column's captions
    pub x1: f32,
}

/// Decode geometry derived from a trusted header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    /// Index of the header row; only rows after it are decoded
    pub header_row: usize,
    /// Right edge of the name column
    pub name_end: f32,
    /// Value column anchor
    pub value_x: f32,
    /// Units column anchor
    pub units_x: f32,
    /// Reference column anchor
    pub reference_x: f32,
    /// Columns found in the header band, in kind order
    pub columns: Vec<ColumnBand>,
}

impl HeaderLayout {
    /// Midpoints between neighbouring columns: name|value, value|units, units|reference.
    pub fn separators(&self) -> [f32; 3] {
        [
            (self.name_end + self.value_x) / 2.0,
            (self.value_x + self.units_x) / 2.0,
            (self.units_x + self.reference_x) / 2.0,
        ]
    }

    /// Column a horizontal center falls into.
    pub fn column_for(&self, x_center: f32) -> ColumnKind {
        let [s1, s2, s3] = self.separators();
        if x_center < s1 {
            ColumnKind::Name
        } else if x_center < s2 {
            ColumnKind::Value
        } else if x_center < s3 {
            ColumnKind::Units
        } else {
            ColumnKind::Reference
        }
    }
}

/// A header caption found on the page.
#[derive(Debug, Clone, Copy)]
struct HeaderPoint {
    kind: ColumnKind,
    x0: f32,
    x_center: f32,
    x1: f32,
    y_center: f32,
}

#[derive(Debug, Default)]
struct HeaderBand {
    points: Vec<HeaderPoint>,
    kinds: BTreeSet<ColumnKind>,
    mean_y: f32,
}

impl HeaderBand {
    fn push(&mut self, point: HeaderPoint) {
        self.points.push(point);
        self.kinds.insert(point.kind);
        let n = self.points.len() as f32;
        self.mean_y += (point.y_center - self.mean_y) / n;
    }

    fn xs(&self, kind: ColumnKind) -> impl Iterator<Item = &HeaderPoint> {
        self.points.iter().filter(move |p| p.kind == kind)
    }

    fn anchor(&self, kind: ColumnKind) -> Option<f32> {
        let centers: Vec<f32> = self.xs(kind).map(|p| p.x_center).collect();
        median(&centers)
    }
}

fn collect_points(rows: &[Row]) -> Vec<HeaderPoint> {
    let mut points = Vec::new();
    for row in rows {
        for cell in &row.cells {
            if let Some(kind) = header_kind(&cell.text) {
                points.push(HeaderPoint {
                    kind,
                    x0: cell.bbox.x0,
                    x_center: cell.center_x(),
                    x1: cell.bbox.x1,
                    y_center: cell.center_y(),
                });
            }
        }
    }
    points
}

fn group_bands(mut points: Vec<HeaderPoint>, tolerance: f32) -> Vec<HeaderBand> {
    points.sort_by(|a, b| safe_float_cmp(a.y_center, b.y_center));

    let mut bands: Vec<HeaderBand> = Vec::new();
    for point in points {
        match bands.last_mut() {
            Some(band) if (point.y_center - band.mean_y).abs() <= tolerance => band.push(point),
            _ => {
                let mut band = HeaderBand::default();
                band.push(point);
                bands.push(band);
            },
        }
    }
    bands
}

/// Locate the table header among `rows` and derive its column anchors.
///
/// Returns `None` when no band names at least `min_kinds` distinct column
/// kinds (never fewer than [`MIN_HEADER_KINDS`]), or when the winning band
/// lacks a value or reference caption. A missing units caption is tolerated:
/// its anchor is placed halfway between the value and reference anchors.
pub fn locate_header(rows: &[Row], band_tolerance: f32, min_kinds: usize) -> Option<HeaderLayout> {
    let bands = group_bands(collect_points(rows), band_tolerance);

    let mut best: Option<&HeaderBand> = None;
    for band in &bands {
        let better = match best {
            None => true,
            Some(b) => (band.kinds.len(), band.points.len()) > (b.kinds.len(), b.points.len()),
        };
        if better {
            best = Some(band);
        }
    }
    let band = best?;

    let required = min_kinds.max(MIN_HEADER_KINDS);
    if band.kinds.len() < required {
        log::debug!(
            "header rejected: best band has {} kind(s), need {}",
            band.kinds.len(),
            required
        );
        return None;
    }

    let value_x = band.anchor(ColumnKind::Value)?;
    let reference_x = band.anchor(ColumnKind::Reference)?;
    let units_x = band
        .anchor(ColumnKind::Units)
        .unwrap_or((value_x + reference_x) / 2.0);

    let name_end = band
        .xs(ColumnKind::Name)
        .map(|p| p.x1)
        .reduce(f32::max)
        .or_else(|| band.xs(ColumnKind::Value).map(|p| p.x0).reduce(f32::min))?;

    let header_row = rows
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            safe_float_cmp((a.mean_y() - band.mean_y).abs(), (b.mean_y() - band.mean_y).abs())
        })
        .map(|(idx, _)| idx)?;

    let columns = band
        .kinds
        .iter()
        .filter_map(|&kind| {
            let x_center = band.anchor(kind)?;
            let x1 = band.xs(kind).map(|p| p.x1).reduce(f32::max)?;
            Some(ColumnBand { kind, x_center, x1 })
        })
        .collect();

    log::debug!(
        "header at row {}: name_end={:.1} value={:.1} units={:.1} reference={:.1}",
        header_row,
        name_end,
        value_x,
        units_x,
        reference_x
    );

    Some(HeaderLayout {
        header_row,
        name_end,
        value_x,
        units_x,
        reference_x,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rows::build_rows;
    use crate::layout::spans::Token;

    fn tok(text: &str, x0: f32, x1: f32, y0: f32) -> Token {
        Token::new(text, x0, y0, x1, y0 + 10.0)
    }

    fn rows_of(tokens: Vec<Token>) -> Vec<Row> {
        build_rows(&tokens, 2.8, 6.0)
    }

    #[test]
    fn test_locate_header_four_columns() {
        let rows = rows_of(vec![
            tok("Лабораторный центр", 10.0, 200.0, 20.0),
            tok("Исследование", 10.0, 80.0, 60.0),
            tok("Результат", 120.0, 170.0, 60.0),
            tok("Ед. изм.", 200.0, 240.0, 61.0),
            tok("Референсные значения", 280.0, 380.0, 60.0),
            tok("Глюкоза", 10.0, 50.0, 80.0),
            tok("5.6", 130.0, 145.0, 80.0),
        ]);

        let layout = locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS).unwrap();
        assert_eq!(layout.header_row, 1);
        assert_eq!(layout.name_end, 80.0);
        assert_eq!(layout.value_x, 145.0);
        assert_eq!(layout.units_x, 220.0);
        assert_eq!(layout.reference_x, 330.0);
        assert_eq!(layout.columns.len(), 4);
    }

    #[test]
    fn test_locate_header_rejects_two_kinds() {
        let rows = rows_of(vec![
            tok("Показатель", 10.0, 80.0, 60.0),
            tok("Значение", 120.0, 170.0, 60.0),
            tok("Глюкоза", 10.0, 50.0, 80.0),
            tok("5.6", 130.0, 145.0, 80.0),
        ]);
        assert!(locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS).is_none());
    }

    #[test]
    fn test_locate_header_min_kinds_never_below_three() {
        let rows = rows_of(vec![
            tok("Показатель", 10.0, 80.0, 60.0),
            tok("Значение", 120.0, 170.0, 60.0),
        ]);
        assert!(locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, 1).is_none());
    }

    #[test]
    fn test_locate_header_without_units_caption() {
        let rows = rows_of(vec![
            tok("Test", 10.0, 60.0, 50.0),
            tok("Value", 120.0, 150.0, 50.0),
            tok("Reference", 220.0, 280.0, 50.0),
        ]);
        let layout = locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS).unwrap();
        assert_eq!(layout.value_x, 135.0);
        assert_eq!(layout.reference_x, 250.0);
        assert_eq!(layout.units_x, 192.5);
    }

    #[test]
    fn test_locate_header_requires_value_column() {
        let rows = rows_of(vec![
            tok("Исследование", 10.0, 80.0, 60.0),
            tok("Ед.", 200.0, 220.0, 60.0),
            tok("Норма", 280.0, 320.0, 60.0),
        ]);
        assert!(locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS).is_none());
    }

    #[test]
    fn test_locate_header_prefers_richer_band() {
        // A legend line with two captions above the real header
        let rows = rows_of(vec![
            tok("Результат", 10.0, 60.0, 10.0),
            tok("норма", 100.0, 130.0, 10.0),
            tok("Исследование", 10.0, 80.0, 60.0),
            tok("Результат", 120.0, 170.0, 60.0),
            tok("Ед.", 200.0, 220.0, 60.0),
            tok("Норма", 280.0, 320.0, 60.0),
        ]);
        let layout = locate_header(&rows, DEFAULT_HEADER_BAND_TOLERANCE, MIN_HEADER_KINDS).unwrap();
        assert_eq!(layout.header_row, 1);
        assert_eq!(layout.reference_x, 300.0);
    }

    #[test]
    fn test_column_for() {
        let layout = HeaderLayout {
            header_row: 0,
            name_end: 60.0,
            value_x: 135.0,
            units_x: 192.5,
            reference_x: 250.0,
            columns: vec![],
        };
        assert_eq!(layout.column_for(30.0), ColumnKind::Name);
        assert_eq!(layout.column_for(127.5), ColumnKind::Value);
        assert_eq!(layout.column_for(190.0), ColumnKind::Units);
        assert_eq!(layout.column_for(237.5), ColumnKind::Reference);
    }
}
