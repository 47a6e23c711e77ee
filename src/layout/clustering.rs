//! One-dimensional clustering helpers for column detection.
//!
//! Table columns show up as dense bands of x positions. This module offers
//! a median for column anchors and a fixed-iteration two-means (Lloyd's
//! algorithm with k = 2) that splits a page's numeric positions into a value
//! band and a reference band.

use crate::utils::safe_float_cmp;

/// Two cluster centers, ordered so that `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoMeans {
    /// Center of the lower-x cluster
    pub low: f32,
    /// Center of the higher-x cluster
    pub high: f32,
}

/// Median of `values`, or `None` when empty.
///
/// Even-length inputs yield the mean of the two middle values.
///
/// # Examples
///
/// ```
/// use lab_oxide::layout::clustering::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| safe_float_cmp(*a, *b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Value at the given percentile (0.0..=1.0) of already sorted data.
fn percentile_sorted(sorted: &[f32], p: f32) -> f32 {
    let idx = ((sorted.len() - 1) as f32 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Split 1-D points into two clusters with a fixed number of Lloyd iterations.
///
/// Centers are seeded at the 25th and 75th percentiles. Each iteration
/// assigns every point to the nearer center (ties go to the first) and moves
/// each center to the mean of its points; a center with no points stays put.
/// There is no convergence check.
///
/// Returns `None` for an empty input.
pub fn two_means(points: &[f32], iterations: usize) -> Option<TwoMeans> {
    if points.is_empty() {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| safe_float_cmp(*a, *b));

    let mut c1 = percentile_sorted(&sorted, 0.25);
    let mut c2 = percentile_sorted(&sorted, 0.75);

    for _ in 0..iterations {
        let (mut sum1, mut n1, mut sum2, mut n2) = (0.0f32, 0usize, 0.0f32, 0usize);
        for &x in &sorted {
            if (x - c1).abs() <= (x - c2).abs() {
                sum1 += x;
                n1 += 1;
            } else {
                sum2 += x;
                n2 += 1;
            }
        }
        if n1 > 0 {
            c1 = sum1 / n1 as f32;
        }
        if n2 > 0 {
            c2 = sum2 / n2 as f32;
        }
    }

    Some(TwoMeans {
        low: c1.min(c2),
        high: c1.max(c2),
    })
}
