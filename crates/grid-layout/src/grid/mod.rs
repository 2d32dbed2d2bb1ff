mod articulations;
mod classify;
mod columns;
mod corridors;
mod index;
mod rows;
mod state;
mod tree;

use crate::{
    CancelToken, Cancelled, EntryVertex, GridCell, GridGeometry, LayoutEngine, Point,
    VertexPositions,
};
use petgraph::visit::{IntoEdgeReferences, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

use articulations::route_edges;
use classify::classify;
use columns::assign_columns;
use corridors::assign_main_columns;
use index::{index_graph, GridIndex};
use rows::assign_rows;
use state::LayoutState;
use tree::{find_merge_points, select_tree};

/// Errors of a grid layout run, in terms of the host graph's ids
#[derive(Debug, Error)]
pub enum GridLayoutError<N, E>
where
    N: Debug,
    E: Debug,
{
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("vertex {0:?} is enumerated twice")]
    DuplicateVertex(N),

    #[error("edge {0:?} is enumerated twice")]
    DuplicateEdge(E),

    #[error("edge {edge:?} ends on unknown vertex {vertex:?}")]
    DanglingEdge { edge: E, vertex: N },

    #[error("no position for vertex {0:?}")]
    MissingPosition(N),

    #[error("row {row} is outside the host geometry ({rows} rows placed)")]
    RowOutOfRange { row: i64, rows: usize },

    #[error("column {column} is outside the host geometry ({columns} columns)")]
    ColumnOutOfRange { column: i64, columns: usize },

    #[error("vertex {vertex:?} was packed at negative column {column}")]
    NegativeColumn { vertex: N, column: i32 },
}

/// Configuration for the grid layout and its edge router
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Horizontal distance of the first bend from the source anchor
    pub node_clearance: f64,

    /// Distance of the first jog from the top of a row gap
    pub vertical_offset: i32,

    /// Height of the gap between rows reserved for horizontal jogs
    pub row_gap: i32,

    /// Spacing between parallel vertical segments in a corridor
    pub segment_spacing: i32,

    /// Segments spread over a column before they start to overlap
    pub max_segments_per_column: i32,

    /// Horizontal inset of the last bend into the target
    pub in_edge_inset: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            node_clearance: 10.0,
            vertical_offset: 10,
            row_gap: 50,
            segment_spacing: 3,
            max_segments_per_column: 15,
            in_edge_inset: 5.0,
        }
    }
}

impl GridLayout {
    /// Create a grid layout routing through gaps of `row_gap` pixels
    pub fn new(row_gap: i32) -> Self {
        Self {
            row_gap,
            ..Default::default()
        }
    }

    /// Horizontal jogs spread over a row gap before they start to overlap
    pub fn max_segments_per_row(&self) -> i32 {
        ((self.row_gap - self.vertical_offset) / self.segment_spacing.max(1)).max(1)
    }
}

/// Grid cells of every vertex, reusable to route edges for several geometries
#[derive(Debug, Clone)]
pub struct GridPlacement<N, E> {
    layout: GridLayout,
    index: GridIndex<N, E>,
    state: LayoutState,
    /// Final cell per dense vertex id
    cells: Vec<GridCell>,
}

impl<N, E> GridPlacement<N, E> {
    /// Number of rows used, zero for an empty graph
    pub fn rows(&self) -> usize {
        self.state.rows
    }

    /// Number of columns used, each vertex spanning two of them
    pub fn columns(&self) -> usize {
        self.state.columns
    }

    pub fn len(&self) -> usize {
        self.state.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.nodes.is_empty()
    }
}

impl<N, E> GridPlacement<N, E>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Cell of a single vertex
    pub fn cell(&self, node: N) -> Option<GridCell> {
        let id = self.index.vertex_id(node)?;
        self.cells.get(id).copied()
    }

    /// Vertices and their cells, in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (N, GridCell)> + '_ {
        self.index
            .vertices
            .iter()
            .copied()
            .zip(self.cells.iter().copied())
    }

    pub fn cells(&self) -> HashMap<N, GridCell> {
        self.iter().collect()
    }

    /// Route every edge of the placed graph
    ///
    /// `positions` anchors each vertex in pixels and `geometry` gives the
    /// pixel extent of the rows and columns the host laid out. Edges that run
    /// straight down their own column get no bend points.
    ///
    /// # Errors
    /// Fails when cancelled, or when `positions` or `geometry` lack a vertex,
    /// row or column the placement uses.
    pub fn edge_articulations<P, M>(
        &self,
        positions: &P,
        geometry: &M,
        cancel: &CancelToken,
    ) -> Result<HashMap<E, Vec<Point>>, GridLayoutError<N, E>>
    where
        P: VertexPositions<N>,
        M: GridGeometry,
    {
        cancel.check()?;
        route_edges(
            &self.layout,
            &self.index,
            &self.state,
            positions,
            geometry,
            cancel,
        )
    }
}

/// Convert packed columns into grid cells, failing on a negative column
fn grid_cells<N, E>(
    index: &GridIndex<N, E>,
    state: &LayoutState,
) -> Result<Vec<GridCell>, GridLayoutError<N, E>>
where
    N: Copy + Debug,
    E: Debug,
{
    state
        .nodes
        .iter()
        .zip(&index.vertices)
        .map(|(node, &vertex)| {
            let column = usize::try_from(node.col).map_err(|_| {
                GridLayoutError::NegativeColumn {
                    vertex,
                    column: node.col,
                }
            })?;
            Ok(GridCell::new(node.row, column))
        })
        .collect()
}

/// Run every pass from cycle classification to corridor assignment
fn place(state: &mut LayoutState, cancel: &CancelToken) -> Result<(), Cancelled> {
    classify(state, cancel)?;
    assign_rows(state, cancel)?;
    select_tree(state, cancel)?;
    find_merge_points(state, cancel)?;
    assign_columns(state, cancel)?;
    assign_main_columns(state, cancel)
}

impl GridLayout {
    /// Assign a grid cell to every vertex of `graph`
    ///
    /// The traversal starts at the last vertex `entry` flags, or at the first
    /// vertex when none is flagged. Rows follow the longest path from the
    /// sources once cycles are broken, and columns come from packing a
    /// spanning forest of the resulting dag.
    ///
    /// # Errors
    /// Fails when cancelled, or when the graph enumerates a vertex or an edge
    /// twice or has an edge ending outside of it.
    pub fn compute_grid_placement<G, V>(
        &self,
        graph: G,
        entry: &V,
        cancel: &CancelToken,
    ) -> Result<GridPlacement<G::NodeId, G::EdgeId>, GridLayoutError<G::NodeId, G::EdgeId>>
    where
        G: IntoNodeIdentifiers + IntoEdgeReferences,
        G::NodeId: Copy + Eq + Hash + Debug,
        G::EdgeId: Copy + Eq + Hash + Debug,
        V: EntryVertex<G::NodeId>,
    {
        cancel.check()?;
        let (index, mut state) = index_graph(graph, entry, cancel)?;
        place(&mut state, cancel)?;
        let cells = grid_cells(&index, &state)?;

        Ok(GridPlacement {
            layout: self.clone(),
            index,
            state,
            cells,
        })
    }

    /// Place `graph` and route all of its edges in one go
    ///
    /// # Errors
    /// See [`GridLayout::compute_grid_placement`] and
    /// [`GridPlacement::edge_articulations`].
    pub fn compute_edge_articulations<G, V, P, M>(
        &self,
        graph: G,
        entry: &V,
        positions: &P,
        geometry: &M,
        cancel: &CancelToken,
    ) -> Result<HashMap<G::EdgeId, Vec<Point>>, GridLayoutError<G::NodeId, G::EdgeId>>
    where
        G: IntoNodeIdentifiers + IntoEdgeReferences,
        G::NodeId: Copy + Eq + Hash + Debug,
        G::EdgeId: Copy + Eq + Hash + Debug,
        V: EntryVertex<G::NodeId>,
        P: VertexPositions<G::NodeId>,
        M: GridGeometry,
    {
        self.compute_grid_placement(graph, entry, cancel)?
            .edge_articulations(positions, geometry, cancel)
    }
}

// Implement LayoutEngine for any graph with the required capabilities
impl<G> LayoutEngine<G> for GridLayout
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
{
    type NodeId = G::NodeId;
    type EdgeId = G::EdgeId;
    type Error = GridLayoutError<G::NodeId, G::EdgeId>;

    fn place<V>(
        &self,
        graph: G,
        entry: &V,
        cancel: &CancelToken,
    ) -> Result<HashMap<Self::NodeId, GridCell>, Self::Error>
    where
        V: EntryVertex<Self::NodeId>,
    {
        Ok(self.compute_grid_placement(graph, entry, cancel)?.cells())
    }

    fn route<V, P, M>(
        &self,
        graph: G,
        entry: &V,
        positions: &P,
        geometry: &M,
        cancel: &CancelToken,
    ) -> Result<HashMap<Self::EdgeId, Vec<Point>>, Self::Error>
    where
        V: EntryVertex<Self::NodeId>,
        P: VertexPositions<Self::NodeId>,
        M: GridGeometry,
    {
        self.compute_edge_articulations(graph, entry, positions, geometry, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridMetrics;
    use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
    use petgraph::graphmap::DiGraphMap;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;
    use test_log::test;

    fn graph(node_count: usize, edges: &[(u32, u32)]) -> DiGraph<(), ()> {
        let mut graph = DiGraph::new();
        for _ in 0..node_count {
            graph.add_node(());
        }
        graph.extend_with_edges(edges.iter().copied());
        graph
    }

    fn placement(graph: &DiGraph<(), ()>) -> GridPlacement<NodeIndex, EdgeIndex> {
        GridLayout::default()
            .compute_grid_placement(graph, &None::<NodeIndex>, &CancelToken::new())
            .unwrap()
    }

    fn cells(placement: &GridPlacement<NodeIndex, EdgeIndex>) -> Vec<(usize, usize)> {
        placement.iter().map(|(_, c)| (c.row, c.column)).collect()
    }

    /// Anchor every vertex at the center of its cell
    fn centers(
        placement: &GridPlacement<NodeIndex, EdgeIndex>,
        metrics: &GridMetrics,
    ) -> HashMap<NodeIndex, Point> {
        placement
            .iter()
            .map(|(node, cell)| (node, metrics.cell_center(cell.row, cell.column).unwrap()))
            .collect()
    }

    /// Small pseudo random graph, reproducible from `seed`
    fn random_graph(seed: u64, node_count: usize, edge_count: usize) -> DiGraph<(), ()> {
        let mut rng = StdRng::seed_from_u64(seed);
        let node_count = node_count as u32;
        let edges: Vec<(u32, u32)> = (0..edge_count)
            .map(|_| (rng.random_range(0..node_count), rng.random_range(0..node_count)))
            .collect();
        graph(node_count as usize, &edges)
    }

    #[test]
    fn single_vertex() {
        let graph = graph(1, &[]);
        let placement = placement(&graph);

        assert_eq!(cells(&placement), vec![(0, 0)]);
        assert_eq!(placement.rows(), 1);
        assert_eq!(placement.columns(), 2);
    }

    #[test]
    fn empty_graph() {
        let graph = graph(0, &[]);
        let placement = placement(&graph);

        assert!(placement.is_empty());
        assert_eq!((placement.rows(), placement.columns()), (0, 0));
        let routes = placement
            .edge_articulations(
                &HashMap::<NodeIndex, Point>::new(),
                &GridMetrics::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn chain_is_one_straight_column() {
        let graph = graph(3, &[(0, 1), (1, 2)]);
        let placement = placement(&graph);
        let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);

        let routes = placement
            .edge_articulations(&centers(&placement, &metrics), &metrics, &CancelToken::new())
            .unwrap();

        assert_eq!(cells(&placement), vec![(0, 0), (1, 0), (2, 0)]);
        assert!(routes.values().all(Vec::is_empty));
    }

    #[test]
    fn diamond_merge_between_branches() {
        let graph = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let placement = placement(&graph);
        let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);

        let routes = placement
            .edge_articulations(&centers(&placement, &metrics), &metrics, &CancelToken::new())
            .unwrap();

        let cells = cells(&placement);
        assert_eq!(cells[0].0, 0);
        assert_eq!((cells[1].0, cells[2].0, cells[3].0), (1, 1, 2));
        assert_ne!(cells[1].1, cells[2].1);
        let (low, high) = (cells[1].1.min(cells[2].1), cells[1].1.max(cells[2].1));
        assert!(low <= cells[3].1 && cells[3].1 <= high);
        assert!(routes.values().all(|points| points.len() <= 2));
    }

    #[test]
    fn cycle_is_layered_from_entry() {
        let graph = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let placement = placement(&graph);
        let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);

        let routes = placement
            .edge_articulations(&centers(&placement, &metrics), &metrics, &CancelToken::new())
            .unwrap();

        let rows: Vec<usize> = cells(&placement).iter().map(|c| c.0).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn entry_vertex_roots_the_traversal() {
        let graph = graph(3, &[(0, 1), (1, 2), (2, 0)]);

        let placement = GridLayout::default()
            .compute_grid_placement(&graph, &Some(NodeIndex::new(1)), &CancelToken::new())
            .unwrap();

        assert_eq!(placement.cell(NodeIndex::new(1)).map(|c| c.row), Some(0));
        assert_eq!(placement.cell(NodeIndex::new(0)).map(|c| c.row), Some(2));
    }

    #[test]
    fn forward_edges_point_down() {
        for seed in 0..20 {
            let graph = random_graph(seed, 12, 20);
            let placement = placement(&graph);
            let state = &placement.state;

            for (node, layout) in state.nodes.iter().enumerate() {
                for edge in layout.dag_edges.iter().filter(|e| e.is_forward()) {
                    assert!(
                        state.nodes[edge.target].row > layout.row,
                        "seed {seed}: {node} -> {} does not point down",
                        edge.target
                    );
                }
            }
        }
    }

    #[test]
    fn tree_edges_form_a_forest() {
        for seed in 0..20 {
            let graph = random_graph(seed, 12, 20);
            let placement = placement(&graph);
            let state = &placement.state;

            let mut parents = vec![0; state.nodes.len()];
            for (node, layout) in state.nodes.iter().enumerate() {
                for &child in &layout.tree_edges {
                    assert!(layout.dag_edges.iter().any(|e| e.target == child));
                    assert_eq!(state.nodes[child].row, layout.row + 1, "seed {seed}: {node}");
                    parents[child] += 1;
                }
            }
            assert!(parents.iter().all(|&count| count <= 1), "seed {seed}");
        }
    }

    #[test]
    fn cells_are_distinct_per_row() {
        for seed in 0..20 {
            let graph = random_graph(seed, 12, 20);
            let placement = placement(&graph);
            let state = &placement.state;

            let mut seen = HashSet::new();
            for layout in &state.nodes {
                assert!(layout.col >= 0, "seed {seed}");
                assert!(seen.insert((layout.row, layout.col)), "seed {seed}");
                assert!((layout.col as usize) + 2 <= placement.columns());
                assert!(layout.row < placement.rows());
            }
        }
    }

    #[test]
    fn every_edge_is_routed() {
        for seed in 0..10 {
            let graph = random_graph(seed, 10, 18);
            let placement = placement(&graph);
            let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);

            let routes = placement
                .edge_articulations(&centers(&placement, &metrics), &metrics, &CancelToken::new())
                .unwrap();

            assert_eq!(routes.len(), graph.edge_count(), "seed {seed}");
            assert!(routes.values().all(|p| matches!(p.len(), 0 | 2 | 4)));
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = random_graph(7, 15, 25);
        let layout = GridLayout::default();
        let cancel = CancelToken::new();

        let first = layout.compute_grid_placement(&graph, &None::<NodeIndex>, &cancel).unwrap();
        let metrics = GridMetrics::for_placement(&first, 40, 50, 30);
        let positions = centers(&first, &metrics);
        let second = layout.compute_grid_placement(&graph, &None::<NodeIndex>, &cancel).unwrap();

        assert_eq!(first.cells(), second.cells());
        // The placement is not consumed by routing
        let routes = first.edge_articulations(&positions, &metrics, &cancel).unwrap();
        assert_eq!(routes, first.edge_articulations(&positions, &metrics, &cancel).unwrap());
        assert_eq!(
            routes,
            layout
                .compute_edge_articulations(&graph, &None::<NodeIndex>, &positions, &metrics, &cancel)
                .unwrap()
        );
    }

    #[test]
    fn cancelled_before_placement() {
        let graph = graph(3, &[(0, 1), (1, 2)]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result =
            GridLayout::default().compute_grid_placement(&graph, &None::<NodeIndex>, &cancel);

        assert!(matches!(result, Err(GridLayoutError::Cancelled(_))));
    }

    #[test]
    fn cancelled_before_routing() {
        let graph = graph(3, &[(0, 1), (1, 2)]);
        let placement = placement(&graph);
        let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = placement.edge_articulations(&centers(&placement, &metrics), &metrics, &cancel);

        assert!(matches!(result, Err(GridLayoutError::Cancelled(_))));
    }

    #[test]
    fn graph_map_vertices_and_edges() {
        let graph = DiGraphMap::<&str, ()>::from_edges([
            ("entry", "body"),
            ("body", "entry"),
            ("body", "exit"),
        ]);
        let entry = |node: &str| node == "entry";
        let layout = GridLayout::default();

        let placement = layout.place(&graph, &entry, &CancelToken::new()).unwrap();
        let metrics = GridMetrics::uniform(3, 2, 40, 50, 30);
        let positions = |node: &str| {
            let cell = placement.get(node)?;
            metrics.cell_center(cell.row, cell.column)
        };
        let routes = layout
            .route(&graph, &entry, &positions, &metrics, &CancelToken::new())
            .unwrap();

        assert_eq!(placement["entry"], GridCell::new(0, 0));
        assert_eq!(placement["exit"], GridCell::new(2, 0));
        assert_eq!(routes.len(), 3);
        for (from, to, _) in graph.all_edges() {
            assert!(routes.contains_key(&(from, to)));
        }
    }

    #[test]
    fn routing_needs_the_host_geometry() {
        let graph = graph(2, &[(0, 1)]);
        let placement = placement(&graph);
        let metrics = GridMetrics::for_placement(&placement, 40, 50, 30);
        let mut positions = centers(&placement, &metrics);
        positions.remove(&NodeIndex::new(1));

        let result = placement.edge_articulations(&positions, &metrics, &CancelToken::new());

        assert!(matches!(result, Err(GridLayoutError::MissingPosition(n)) if n == NodeIndex::new(1)));
    }

    #[test]
    fn max_segments_per_row_from_gap() {
        assert_eq!(GridLayout::default().max_segments_per_row(), 13);
        assert_eq!(GridLayout::new(16).max_segments_per_row(), 2);
        assert_eq!(GridLayout::new(5).max_segments_per_row(), 1);
    }

    #[test]
    fn three_way_merge_keeps_packed_column() {
        let graph = graph(5, &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)]);
        let placement = placement(&graph);

        assert_eq!(cells(&placement), vec![(0, 2), (1, 0), (1, 2), (1, 4), (2, 0)]);
    }

    #[test]
    fn negative_column_is_reported() {
        let graph = graph(2, &[(0, 1)]);
        let placement = placement(&graph);
        let mut state = placement.state.clone();
        state.nodes[1].col = -2;

        let result = grid_cells(&placement.index, &state);

        assert!(matches!(
            result,
            Err(GridLayoutError::NegativeColumn { vertex, column: -2 }) if vertex == NodeIndex::new(1)
        ));
        assert_eq!(
            grid_cells(&placement.index, &placement.state).unwrap(),
            vec![GridCell::new(0, 0), GridCell::new(1, 0)]
        );
    }
}
