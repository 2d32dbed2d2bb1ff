#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D point in layout space, with f64 coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer cell of the layout grid assigned to a vertex
///
/// A vertex occupies two adjacent grid columns starting at `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

impl GridCell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Pixel extent of one grid row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RowGeometry {
    pub y: i32,
    pub height: i32,
}

impl RowGeometry {
    pub fn new(y: i32, height: i32) -> Self {
        Self { y, height }
    }

    /// Y coordinate of the bottom edge of the row
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Pixel extent of one grid column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnGeometry {
    pub x: i32,
    /// Width of the column without the host's condensed padding
    pub padded_width: i32,
}

impl ColumnGeometry {
    pub fn new(x: i32, padded_width: i32) -> Self {
        Self { x, padded_width }
    }
}
