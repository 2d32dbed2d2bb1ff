use super::state::LayoutState;
use super::GridLayoutError;
use crate::{CancelToken, EntryVertex};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Bidirectional mapping between host identities and dense layout ids
#[derive(Debug, Clone)]
pub(crate) struct GridIndex<N, E> {
    pub vertices: Vec<N>,
    pub vertex_ids: HashMap<N, usize>,
    pub edges: Vec<E>,
    pub edge_ids: HashMap<E, usize>,
}

impl<N, E> GridIndex<N, E>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn vertex_id(&self, node: N) -> Option<usize> {
        self.vertex_ids.get(&node).copied()
    }
}

/// Assign dense ids to every vertex and edge and build the layout arena
///
/// Vertices are numbered in `node_identifiers()` order and edges in
/// `edge_references()` order. The last vertex flagged as entry becomes the
/// traversal root, vertex 0 when none is.
pub(crate) fn index_graph<G, V>(
    graph: G,
    entry: &V,
    cancel: &CancelToken,
) -> Result<(GridIndex<G::NodeId, G::EdgeId>, LayoutState), GridLayoutError<G::NodeId, G::EdgeId>>
where
    G: IntoNodeIdentifiers + IntoEdgeReferences,
    G::NodeId: Copy + Eq + Hash + Debug,
    G::EdgeId: Copy + Eq + Hash + Debug,
    V: EntryVertex<G::NodeId>,
{
    let mut vertices = Vec::new();
    let mut vertex_ids = HashMap::new();
    let mut entry_id = None;
    for node in graph.node_identifiers() {
        cancel.check()?;
        let id = vertices.len();
        if vertex_ids.insert(node, id).is_some() {
            return Err(GridLayoutError::DuplicateVertex(node));
        }
        if entry.is_entry(node) {
            entry_id = Some(id);
        }
        vertices.push(node);
    }

    let mut edges = Vec::new();
    let mut edge_ids = HashMap::new();
    let mut endpoints = Vec::new();
    for edge in graph.edge_references() {
        cancel.check()?;
        let lookup = |vertex: G::NodeId| {
            vertex_ids
                .get(&vertex)
                .copied()
                .ok_or(GridLayoutError::DanglingEdge {
                    edge: edge.id(),
                    vertex,
                })
        };
        let from = lookup(edge.source())?;
        let to = lookup(edge.target())?;
        if edge_ids.insert(edge.id(), edges.len()).is_some() {
            return Err(GridLayoutError::DuplicateEdge(edge.id()));
        }
        edges.push(edge.id());
        endpoints.push((from, to));
    }

    debug!(
        "Indexed {} vertices and {} edges, entry is {:?}",
        vertices.len(),
        edges.len(),
        entry_id
    );

    let mut state = LayoutState::new(vertices.len(), endpoints);
    state.entry = entry_id.unwrap_or(0);

    Ok((
        GridIndex {
            vertices,
            vertex_ids,
            edges,
            edge_ids,
        },
        state,
    ))
}
