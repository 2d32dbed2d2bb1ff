//! Grid layout for directed graphs with an entry vertex
//!
//! This crate lays out control-flow style graphs on an integer grid and
//! routes their edges as orthogonal polylines. It works with any graph
//! implementing petgraph's visitor traits.
//!
//! Layout happens in two phases. [`GridLayout::compute_grid_placement`]
//! assigns every vertex a row and a column, depending only on the graph
//! structure. The host then sizes rows and columns in pixels and hands that
//! geometry to [`GridPlacement::edge_articulations`], which computes the bend
//! points of every edge.
//!
//! # Example
//!
//! ```
//! use grid_layout::{CancelToken, GridLayout, GridMetrics};
//! use petgraph::graphmap::DiGraphMap;
//!
//! // An if/else diamond
//! let graph = DiGraphMap::<u32, ()>::from_edges([(0, 1), (0, 2), (1, 3), (2, 3)]);
//! let cancel = CancelToken::new();
//!
//! // Place the vertices, starting from vertex 0
//! let layout = GridLayout::default();
//! let placement = layout.compute_grid_placement(&graph, &Some(0u32), &cancel).unwrap();
//! assert_eq!(placement.cell(0).unwrap().row, 0);
//! assert_eq!(placement.cell(3).unwrap().row, 2);
//!
//! // Size the grid, anchor vertices at their cell centers, then route
//! let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);
//! let positions = |node: u32| {
//!     let cell = placement.cell(node)?;
//!     metrics.cell_center(cell.row, cell.column)
//! };
//! let articulations = placement.edge_articulations(&positions, &metrics, &cancel).unwrap();
//! assert_eq!(articulations.len(), 4);
//! ```

mod cancel;
mod engine;
mod geometry;
mod host;

pub mod grid;

// Re-export core types and traits
pub use cancel::{CancelToken, Cancelled};
pub use engine::LayoutEngine;
pub use geometry::{ColumnGeometry, GridCell, Point, RowGeometry};
pub use host::{EntryVertex, GridGeometry, GridMetrics, VertexPositions};

// Re-export petgraph visitor traits for graph abstraction
pub use petgraph::visit::{IntoEdgeReferences, IntoNodeIdentifiers};

// Re-export grid layout types
pub use grid::{GridLayout, GridLayoutError, GridPlacement};
