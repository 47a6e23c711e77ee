//! Row clustering for positioned tokens.
//!
//! Tokens are grouped into visual rows by vertical proximity, then tokens
//! that sit almost edge to edge inside a row are merged into logical cells,
//! which restores numbers and words the PDF producer split into several
//! spans (`"12"` + `".5"` → `"12.5"`).

use crate::geometry::Rect;
use crate::layout::spans::Token;
use crate::utils::safe_float_cmp;
use std::cmp::Ordering;

/// Default vertical tolerance for grouping tokens into a row.
pub const DEFAULT_ROW_TOLERANCE: f32 = 2.8;

/// Default maximum horizontal gap for merging neighbouring tokens.
pub const DEFAULT_CELL_MERGE_GAP: f32 = 6.0;

/// Fraction of the glyph height above which merged fragments are joined with a space.
const WORD_SPACE_RATIO: f32 = 0.25;

/// Whether two fragments are pieces of one number (`"12"` + `".5"`).
fn continues_number(left: &str, right: &str) -> bool {
    let numeric = |c: char| c.is_ascii_digit() || c == '.' || c == ',';
    left.chars().next_back().is_some_and(numeric) && right.chars().next().is_some_and(numeric)
}

/// One visual table line: merged cells ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cells in x order
    pub cells: Vec<Token>,
}

impl Row {
    /// Mean vertical center of the row's cells.
    pub fn mean_y(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(Token::center_y).sum::<f32>() / self.cells.len() as f32
    }

    /// Bounding box covering every cell, if the row is not empty.
    pub fn bbox(&self) -> Option<Rect> {
        let mut cells = self.cells.iter();
        let first = cells.next()?.bbox;
        Some(cells.fold(first, |acc, c| acc.union(&c.bbox)))
    }

    /// Cell texts joined with single spaces.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lowercased [`Row::text`], used for keyword checks.
    pub fn lowercase_text(&self) -> String {
        self.text().to_lowercase()
    }
}

/// Total order used before clustering: vertical center, then left edge, then reader order.
fn reading_order(a: &Token, b: &Token) -> Ordering {
    safe_float_cmp(a.center_y(), b.center_y())
        .then_with(|| safe_float_cmp(a.bbox.x0, b.bbox.x0))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Group tokens into rows by vertical center.
///
/// A new row starts whenever a token's center is more than `tolerance`
/// away from the running mean center of the current row. Tokens keep their
/// sorted order inside each group.
pub fn cluster_rows(tokens: &[Token], tolerance: f32) -> Vec<Vec<Token>> {
    let mut sorted: Vec<Token> = tokens.to_vec();
    sorted.sort_by(reading_order);

    let mut rows: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut mean_y = 0.0f32;

    for token in sorted {
        let cy = token.center_y();
        if !current.is_empty() && (cy - mean_y).abs() > tolerance {
            rows.push(std::mem::take(&mut current));
        }
        current.push(token);
        let n = current.len() as f32;
        mean_y = if n == 1.0 {
            cy
        } else {
            mean_y + (cy - mean_y) / n
        };
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Merge horizontally adjacent tokens of one row into cells.
///
/// Two neighbours merge when the gap between them is non-negative and at
/// most `max_gap`. The merged cell spans from the first token's left edge to
/// the last token's right edge, vertically from the minimum top to the
/// maximum bottom. Word fragments further apart than a quarter of the glyph
/// height are joined with a space; number fragments never are.
pub fn merge_cells(mut row: Vec<Token>, max_gap: f32) -> Vec<Token> {
    row.sort_by(|a, b| {
        safe_float_cmp(a.bbox.x0, b.bbox.x0).then_with(|| a.sequence.cmp(&b.sequence))
    });

    let mut cells: Vec<Token> = Vec::with_capacity(row.len());
    for token in row {
        if let Some(last) = cells.last_mut() {
            let gap = last.bbox.horizontal_gap(&token.bbox);
            if (0.0..=max_gap).contains(&gap) {
                let glyph_height = last.bbox.height().min(token.bbox.height()).max(0.0);
                if gap > glyph_height * WORD_SPACE_RATIO
                    && !continues_number(&last.text, &token.text)
                {
                    last.text.push(' ');
                }
                last.text.push_str(&token.text);
                last.bbox = Rect {
                    x0: last.bbox.x0,
                    y0: last.bbox.y0.min(token.bbox.y0),
                    x1: last.bbox.x1.max(token.bbox.x1),
                    y1: last.bbox.y1.max(token.bbox.y1),
                };
                continue;
            }
        }
        cells.push(token);
    }

    cells
}

/// Cluster a page's tokens into merged rows, top to bottom.
pub fn build_rows(tokens: &[Token], row_tolerance: f32, merge_gap: f32) -> Vec<Row> {
    cluster_rows(tokens, row_tolerance)
        .into_iter()
        .map(|group| Row {
            cells: merge_cells(group, merge_gap),
        })
        .filter(|row| !row.cells.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, x0: f32, y0: f32, width: f32) -> Token {
        Token::new(text, x0, y0, x0 + width, y0 + 10.0)
    }

    #[test]
    fn test_cluster_rows_empty() {
        assert!(cluster_rows(&[], DEFAULT_ROW_TOLERANCE).is_empty());
    }

    #[test]
    fn test_cluster_rows_splits_on_vertical_gap() {
        let tokens = vec![
            tok("Glucose", 10.0, 100.0, 40.0),
            tok("5.6", 120.0, 101.0, 15.0),
            tok("ALT", 10.0, 120.0, 20.0),
            tok("42", 120.0, 119.5, 10.0),
        ];

        let rows = cluster_rows(&tokens, DEFAULT_ROW_TOLERANCE);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[1][0].text, "ALT");
    }

    #[test]
    fn test_cluster_rows_running_mean_absorbs_drift() {
        // Each token is within tolerance of the running mean of its row
        let tokens = vec![
            tok("a", 0.0, 100.0, 5.0),
            tok("b", 20.0, 102.0, 5.0),
            tok("c", 40.0, 103.5, 5.0),
        ];
        let rows = cluster_rows(&tokens, DEFAULT_ROW_TOLERANCE);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_merge_cells_joins_split_number() {
        let row = vec![tok(".5", 22.0, 0.0, 8.0), tok("12", 10.0, 0.0, 12.0)];
        let cells = merge_cells(row, DEFAULT_CELL_MERGE_GAP);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].text, "12.5");
        assert_eq!(cells[0].bbox.x0, 10.0);
        assert_eq!(cells[0].bbox.x1, 30.0);
    }

    #[test]
    fn test_merge_cells_joins_loosely_spaced_number() {
        // 3 and 5.5 units apart: above the word-space ratio, inside the merge gap
        for gap in [3.0, 5.5] {
            let row = vec![tok("12", 145.0, 0.0, 10.0), tok(".5", 155.0 + gap, 0.0, 8.0)];
            let cells = merge_cells(row, DEFAULT_CELL_MERGE_GAP);
            assert_eq!(cells.len(), 1);
            assert_eq!(cells[0].text, "12.5");
        }

        let row = vec![tok("4,", 10.0, 0.0, 8.0), tok("1", 22.0, 0.0, 5.0)];
        assert_eq!(merge_cells(row, DEFAULT_CELL_MERGE_GAP)[0].text, "4,1");

        let row = vec![tok("12", 10.0, 0.0, 10.0), tok("г/л", 24.0, 0.0, 15.0)];
        assert_eq!(merge_cells(row, DEFAULT_CELL_MERGE_GAP)[0].text, "12 г/л");
    }

    #[test]
    fn test_merge_cells_inserts_space_between_words() {
        let row = vec![tok("Общий", 10.0, 0.0, 30.0), tok("белок", 44.0, 0.0, 30.0)];
        let cells = merge_cells(row, DEFAULT_CELL_MERGE_GAP);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].text, "Общий белок");
    }

    #[test]
    fn test_merge_cells_keeps_distant_and_overlapping_apart() {
        let row = vec![
            tok("Glucose", 10.0, 0.0, 40.0),
            tok("5.6", 120.0, 0.0, 15.0),
            // Overlaps "5.6": negative gap, never merged
            tok("*", 130.0, 0.0, 4.0),
        ];
        let cells = merge_cells(row, DEFAULT_CELL_MERGE_GAP);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_build_rows_recomputes_bbox() {
        let tokens = vec![
            Token::new("12", 10.0, 100.0, 22.0, 110.0),
            Token::new(".5", 23.0, 99.0, 30.0, 111.0),
        ];
        let rows = build_rows(&tokens, DEFAULT_ROW_TOLERANCE, DEFAULT_CELL_MERGE_GAP);
        assert_eq!(rows.len(), 1);
        let cell = &rows[0].cells[0];
        assert_eq!(cell.bbox, Rect::new(10.0, 99.0, 30.0, 111.0));
        assert_eq!(rows[0].bbox(), Some(Rect::new(10.0, 99.0, 30.0, 111.0)));
    }

    #[test]
    fn test_row_text_helpers() {
        let row = Row {
            cells: vec![tok("ALT", 0.0, 0.0, 20.0), tok("42", 100.0, 0.0, 10.0)],
        };
        assert_eq!(row.text(), "ALT 42");
        assert_eq!(row.lowercase_text(), "alt 42");
        assert_eq!(row.mean_y(), 5.0);
    }
}
