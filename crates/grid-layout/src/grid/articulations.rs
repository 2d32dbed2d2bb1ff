use super::index::GridIndex;
use super::state::LayoutState;
use super::{GridLayout, GridLayoutError};
use crate::{CancelToken, ColumnGeometry, GridGeometry, Point, RowGeometry, VertexPositions};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Congestion counters of one routing run
///
/// Every horizontal jog placed in the gap under a row, or every vertical run
/// placed in a corridor column, bumps the matching counter. The counter value
/// spreads parallel segments apart until it reaches its cap, after which
/// segments overlap. This is the only mutable state shared between edges.
#[derive(Debug, Default)]
struct SegmentCounters {
    rows: HashMap<i64, i32>,
    columns: HashMap<i32, i32>,
}

impl SegmentCounters {
    fn next_row(&mut self, row: i64, cap: i32) -> i32 {
        increment_capped(self.rows.entry(row).or_insert(0), cap)
    }

    fn next_column(&mut self, column: i32, cap: i32) -> i32 {
        increment_capped(self.columns.entry(column).or_insert(0), cap)
    }
}

fn increment_capped(count: &mut i32, cap: i32) -> i32 {
    *count = (*count + 1).min(cap);
    *count
}

/// Geometry lookups for one routing run, failing on anything the placement
/// did not produce
struct Lookup<'a, N, E, P, M> {
    index: &'a GridIndex<N, E>,
    state: &'a LayoutState,
    positions: &'a P,
    geometry: &'a M,
}

impl<N, E, P, M> Lookup<'_, N, E, P, M>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
    P: VertexPositions<N>,
    M: GridGeometry,
{
    fn position(&self, node: usize) -> Result<Point, GridLayoutError<N, E>> {
        let vertex = self.index.vertices[node];
        self.positions
            .position(vertex)
            .ok_or(GridLayoutError::MissingPosition(vertex))
    }

    fn row(&self, row: i64) -> Result<RowGeometry, GridLayoutError<N, E>> {
        usize::try_from(row)
            .ok()
            .and_then(|row| self.geometry.row(row))
            .ok_or(GridLayoutError::RowOutOfRange {
                row,
                rows: self.state.rows,
            })
    }

    fn column(&self, column: i64) -> Result<ColumnGeometry, GridLayoutError<N, E>> {
        usize::try_from(column)
            .ok()
            .and_then(|column| self.geometry.column(column))
            .ok_or(GridLayoutError::ColumnOutOfRange {
                column,
                columns: self.geometry.column_count(),
            })
    }
}

/// Compute the bend points of every edge from its main column
///
/// Target nodes are visited in topological order and their incoming edges
/// routed together, so that edges converging on a node enter it at distinct
/// x positions spread over the node's column.
pub(crate) fn route_edges<N, E, P, M>(
    layout: &GridLayout,
    index: &GridIndex<N, E>,
    state: &LayoutState,
    positions: &P,
    geometry: &M,
    cancel: &CancelToken,
) -> Result<HashMap<E, Vec<Point>>, GridLayoutError<N, E>>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
    P: VertexPositions<N>,
    M: GridGeometry,
{
    let lookup = Lookup {
        index,
        state,
        positions,
        geometry,
    };
    let mut router = Router {
        layout,
        counters: SegmentCounters::default(),
        row_cap: layout.max_segments_per_row(),
        column_cap: layout.max_segments_per_column.max(1),
    };

    let mut articulations = HashMap::with_capacity(state.edges.len());
    for to in state.topological() {
        cancel.check()?;

        let in_edges = &state.in_edges[to];
        if in_edges.is_empty() {
            continue;
        }
        let to_node = &state.nodes[to];
        let to_pos = lookup.position(to)?;
        let to_top = f64::from(lookup.row(to_node.row as i64)?.y);
        let to_width = lookup.column(i64::from(to_node.col))?.padded_width;
        let in_edge_spacing = to_width / (in_edges.len() as i32 + 1);

        for (rank, &edge) in in_edges.iter().enumerate() {
            let layout_edge = &state.edges[edge];
            let from_node = &state.nodes[layout_edge.from];
            let from_pos = lookup.position(layout_edge.from)?;
            let from_bottom = f64::from(lookup.row(from_node.row as i64)?.bottom());

            let main = layout_edge.main_column;
            let from_col = from_node.col;
            let to_col = to_node.col;
            let to_row = to_node.row as i64;
            // Offset of the last bend from the target anchor, away from the
            // side the edge arrives from
            let entry_shift = |direction: f64| {
                -direction * (layout.in_edge_inset + f64::from(rank as i32 * in_edge_spacing))
            };

            let points = match (main == from_col, main == to_col) {
                (true, true) => Vec::new(),
                (false, true) => {
                    let direction = if main > from_col { 1.0 } else { -1.0 };
                    let y = router.below_source(from_node.row as i64, from_bottom);
                    vec![
                        Point::new(from_pos.x + direction * layout.node_clearance, y),
                        Point::new(to_pos.x, y),
                    ]
                }
                (true, false) => {
                    let y = router.above_target(to_row, to_top);
                    let direction = if main < to_col { 1.0 } else { -1.0 };
                    vec![
                        Point::new(from_pos.x + direction * layout.node_clearance, y),
                        Point::new(to_pos.x + entry_shift(direction), y),
                    ]
                }
                (false, false) => {
                    let direction = if main > from_col { 1.0 } else { -1.0 };
                    let y1 = router.below_source(from_node.row as i64, from_bottom);
                    let x = router.corridor_x(&lookup, main)?;
                    let y2 = router.above_target(to_row, to_top);
                    let direction_in = if main < to_col { 1.0 } else { -1.0 };
                    vec![
                        Point::new(from_pos.x + direction * layout.node_clearance, y1),
                        Point::new(x, y1),
                        Point::new(x, y2),
                        Point::new(to_pos.x + entry_shift(direction_in), y2),
                    ]
                }
            };
            articulations.insert(index.edges[edge], points);
        }
    }

    debug!("Routed {} edges", articulations.len());
    Ok(articulations)
}

struct Router<'a> {
    layout: &'a GridLayout,
    counters: SegmentCounters,
    row_cap: i32,
    column_cap: i32,
}

impl Router<'_> {
    /// Height of the next jog in the gap under `row`
    fn below_source(&mut self, row: i64, bottom: f64) -> f64 {
        let n = self.counters.next_row(row, self.row_cap);
        let spread = self.layout.row_gap - self.layout.vertical_offset;
        bottom + f64::from(self.layout.vertical_offset + spread * n / self.row_cap)
    }

    /// Height of the next jog in the gap above the row under `row`
    fn above_target(&mut self, row: i64, top: f64) -> f64 {
        let n = self.counters.next_row(row - 1, self.row_cap);
        let spread = self.layout.row_gap - self.layout.vertical_offset;
        top - f64::from(self.layout.row_gap)
            + f64::from(self.layout.vertical_offset + spread * n / self.row_cap)
    }

    /// X of the next vertical run through `column`
    ///
    /// Columns -1 and `column_count` are the virtual corridors left of the
    /// first column and right of the last one.
    fn corridor_x<N, E, P, M>(
        &mut self,
        lookup: &Lookup<'_, N, E, P, M>,
        column: i32,
    ) -> Result<f64, GridLayoutError<N, E>>
    where
        N: Copy + Eq + Hash + Debug,
        E: Copy + Eq + Hash + Debug,
        P: VertexPositions<N>,
        M: GridGeometry,
    {
        let n = self.counters.next_column(column, self.column_cap);
        let spacing = self.layout.segment_spacing;
        let column_count = lookup.geometry.column_count() as i64;
        let x = if column == -1 {
            let first = lookup.column(0)?;
            first.x - (first.padded_width >> 2) - n * spacing
        } else if i64::from(column) == column_count {
            let last = lookup.column(column_count - 1)?;
            last.x + 5 * (last.padded_width >> 2) + n * spacing
        } else {
            let corridor = lookup.column(i64::from(column))?;
            corridor.x + corridor.padded_width * n / self.column_cap
        };
        Ok(f64::from(x))
    }
}
