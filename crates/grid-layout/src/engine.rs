use crate::{CancelToken, EntryVertex, GridCell, GridGeometry, Point, VertexPositions};
use std::collections::HashMap;
use std::hash::Hash;

/// A layout engine that places graph vertices on a grid and routes edges
///
/// This trait is generic over the graph type `G`, so hosts can stay generic
/// over the engine and the graph representation alike.
pub trait LayoutEngine<G> {
    /// The type used to identify vertices in the graph
    type NodeId: Copy + Eq + Hash;

    /// The type used to identify edges in the graph
    type EdgeId: Copy + Eq + Hash;

    type Error;

    /// Compute the grid cell of every vertex
    ///
    /// # Errors
    /// Returns an error if the layout is cancelled or the graph is malformed
    fn place<V>(
        &self,
        graph: G,
        entry: &V,
        cancel: &CancelToken,
    ) -> Result<HashMap<Self::NodeId, GridCell>, Self::Error>
    where
        V: EntryVertex<Self::NodeId>;

    /// Compute the bend points of every edge
    ///
    /// # Errors
    /// Returns an error if the layout is cancelled, or if `positions` or
    /// `geometry` do not cover the placement
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
        M: GridGeometry;
}
