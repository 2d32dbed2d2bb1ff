/// How the depth-first classification reached a successor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    /// Target was unvisited or already finished
    Forward,
    /// Target was still on the traversal stack, the edge closes a cycle
    Back,
}

/// Successor recorded while classifying a node's outgoing edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DagEdge {
    pub target: usize,
    pub kind: EdgeKind,
}

impl DagEdge {
    pub fn is_forward(&self) -> bool {
        self.kind == EdgeKind::Forward
    }
}

/// Per-vertex layout bookkeeping
#[derive(Debug, Clone, Default)]
pub(crate) struct LayoutNode {
    pub row: usize,
    /// Relative to the tree parent while packing, absolute afterwards
    pub col: i32,
    pub dag_edges: Vec<DagEdge>,
    pub tree_edges: Vec<usize>,
    pub has_parent: bool,

    // Subtree silhouette, one entry per subtree row, each entry relative to
    // the previous one
    pub left_shape: Vec<i32>,
    pub right_shape: Vec<i32>,
    pub left_position: i32,
    pub right_position: i32,
    pub last_row_left: i32,
    pub last_row_right: i32,
    pub row_count: usize,
}

/// Per-edge layout bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutEdge {
    pub from: usize,
    pub to: usize,
    /// Column the edge runs through; -1 and `columns` are the virtual
    /// corridors on either side of the grid
    pub main_column: i32,
}

/// Everything one layout invocation derives from the graph, indexed by dense
/// node and edge ids
#[derive(Debug, Clone, Default)]
pub(crate) struct LayoutState {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    /// Outgoing edge ids per node, in edge enumeration order
    pub out_edges: Vec<Vec<usize>>,
    /// Incoming edge ids per node, in edge enumeration order
    pub in_edges: Vec<Vec<usize>>,
    pub entry: usize,
    /// Finish order of the depth-first classification, leaves first
    pub sorted: Vec<usize>,
    pub rows: usize,
    pub columns: usize,
}

impl LayoutState {
    /// Empty state for `node_count` nodes and the given `(from, to)` edges
    pub fn new(node_count: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut state = Self {
            nodes: vec![LayoutNode::default(); node_count],
            out_edges: vec![Vec::new(); node_count],
            in_edges: vec![Vec::new(); node_count],
            ..Default::default()
        };
        for (from, to) in edges {
            let id = state.edges.len();
            state.out_edges[from].push(id);
            state.in_edges[to].push(id);
            state.edges.push(LayoutEdge {
                from,
                to,
                main_column: 0,
            });
        }
        state
    }

    /// Nodes in topological order, sources first
    pub fn topological(&self) -> impl Iterator<Item = usize> + '_ {
        self.sorted.iter().rev().copied()
    }
}
