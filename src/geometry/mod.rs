//! Geometric primitives for layout analysis.
//!
//! Page coordinates follow the layout reader's convention: `x` grows to the
//! right and `y` grows downwards, so a smaller `y0` is higher on the page.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box given by its two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use lab_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(10.0, 20.0, 110.0, 32.0);
    /// assert_eq!(rect.width(), 100.0);
    /// assert_eq!(rect.height(), 12.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Smallest rectangle containing both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use lab_oxide::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 20.0, 10.0);
    /// let b = Rect::new(22.0, 1.0, 40.0, 12.0);
    /// assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 40.0, 12.0));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Horizontal gap from this rectangle's right edge to `next`'s left edge.
    ///
    /// Negative when the two overlap horizontally.
    pub fn horizontal_gap(&self, next: &Rect) -> f32 {
        next.x0 - self.x1
    }
}
