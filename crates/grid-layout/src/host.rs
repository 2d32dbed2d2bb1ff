use crate::{ColumnGeometry, GridPlacement, Point, RowGeometry};
use std::collections::HashMap;
use std::hash::Hash;

/// Trait telling the layout which vertex is the traversal root
pub trait EntryVertex<N> {
    /// Whether the given vertex is the entry of the graph
    fn is_entry(&self, node: N) -> bool;
}

// Blanket implementation for closures
impl<N, F> EntryVertex<N> for F
where
    F: Fn(N) -> bool,
{
    fn is_entry(&self, node: N) -> bool {
        self(node)
    }
}

// A known entry vertex, or none at all
impl<N: PartialEq> EntryVertex<N> for Option<N> {
    fn is_entry(&self, node: N) -> bool {
        self.as_ref() == Some(&node)
    }
}

/// Trait for providing the pixel anchor of each vertex during edge routing
pub trait VertexPositions<N> {
    /// Get the anchor point of a vertex, if the host placed it
    fn position(&self, node: N) -> Option<Point>;
}

// Blanket implementation for closures
impl<N, F> VertexPositions<N> for F
where
    F: Fn(N) -> Option<Point>,
{
    fn position(&self, node: N) -> Option<Point> {
        self(node)
    }
}

// Implementation for HashMap
impl<N: Eq + Hash> VertexPositions<N> for HashMap<N, Point> {
    fn position(&self, node: N) -> Option<Point> {
        self.get(&node).copied()
    }
}

/// Trait for providing the pixel geometry of the grid rows and columns
pub trait GridGeometry {
    fn row(&self, index: usize) -> Option<RowGeometry>;

    fn column(&self, index: usize) -> Option<ColumnGeometry>;

    /// Number of columns the host laid out
    fn column_count(&self) -> usize;
}

/// Row and column geometry stored as plain tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridMetrics {
    pub rows: Vec<RowGeometry>,
    pub columns: Vec<ColumnGeometry>,
}

impl GridMetrics {
    pub fn new(rows: Vec<RowGeometry>, columns: Vec<ColumnGeometry>) -> Self {
        Self { rows, columns }
    }

    /// Evenly spaced rows and columns
    ///
    /// Rows are `row_height` tall and separated by `row_gap`, columns are
    /// `column_width` wide with no gap in between.
    pub fn uniform(
        rows: usize,
        columns: usize,
        row_height: i32,
        row_gap: i32,
        column_width: i32,
    ) -> Self {
        let rows = (0..rows)
            .scan(0, |y, _| {
                let row = RowGeometry::new(*y, row_height);
                *y += row_height + row_gap;
                Some(row)
            })
            .collect();
        let columns = (0..columns)
            .scan(0, |x, _| {
                let column = ColumnGeometry::new(*x, column_width);
                *x += column_width;
                Some(column)
            })
            .collect();
        Self { rows, columns }
    }

    /// Uniform geometry sized for a computed placement
    pub fn for_placement<N, E>(
        placement: &GridPlacement<N, E>,
        row_height: i32,
        row_gap: i32,
        column_width: i32,
    ) -> Self {
        Self::uniform(
            placement.rows(),
            placement.columns(),
            row_height,
            row_gap,
            column_width,
        )
    }

    /// Center of the two-column cell at `row`/`column`, if both exist
    pub fn cell_center(&self, row: usize, column: usize) -> Option<Point> {
        let row = self.rows.get(row)?;
        let left = self.columns.get(column)?;
        let width = match self.columns.get(column + 1) {
            Some(right) => left.padded_width + right.padded_width,
            None => left.padded_width,
        };
        Some(Point::new(
            f64::from(left.x) + f64::from(width) / 2.0,
            f64::from(row.y) + f64::from(row.height) / 2.0,
        ))
    }
}

impl GridGeometry for GridMetrics {
    fn row(&self, index: usize) -> Option<RowGeometry> {
        self.rows.get(index).copied()
    }

    fn column(&self, index: usize) -> Option<ColumnGeometry> {
        self.columns.get(index).copied()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }
}
