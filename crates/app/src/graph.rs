use anyhow::{bail, Result};
use grid_layout::{GridCell, Point};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Graph description read from the input file
///
/// ```ron
/// (
///     vertices: ["entry", "loop", "exit"],
///     edges: [(0, 1), (1, 1), (1, 2)],
///     entry: Some(0),
/// )
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GraphFile {
    pub vertices: Vec<String>,
    pub edges: Vec<(usize, usize)>,
    #[serde(default)]
    pub entry: Option<usize>,
}

impl GraphFile {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Build the petgraph graph, vertex and edge indices following the file
    pub fn to_graph(&self) -> Result<DiGraph<String, ()>> {
        let mut graph = DiGraph::with_capacity(self.vertices.len(), self.edges.len());
        for name in &self.vertices {
            graph.add_node(name.clone());
        }
        for &(from, to) in &self.edges {
            if from >= self.vertices.len() || to >= self.vertices.len() {
                bail!("Edge ({from}, {to}) refers to a missing vertex");
            }
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
        if let Some(entry) = self.entry {
            if entry >= self.vertices.len() {
                bail!("Entry vertex {entry} does not exist");
            }
        }
        Ok(graph)
    }

    pub fn entry(&self) -> Option<NodeIndex> {
        self.entry.map(NodeIndex::new)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedVertex {
    pub name: String,
    pub cell: GridCell,
    pub position: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutedEdge {
    pub from: String,
    pub to: String,
    pub articulations: Vec<Point>,
}

/// Layout result written to the output, in input order
#[derive(Debug, Clone, Serialize)]
pub struct LayoutFile {
    pub rows: usize,
    pub columns: usize,
    pub vertices: Vec<PlacedVertex>,
    pub edges: Vec<RoutedEdge>,
}

impl LayoutFile {
    pub fn new(
        graph: &DiGraph<String, ()>,
        rows: usize,
        columns: usize,
        cells: &HashMap<NodeIndex, (GridCell, Point)>,
        mut articulations: HashMap<EdgeIndex, Vec<Point>>,
    ) -> Self {
        let vertices = graph
            .node_indices()
            .filter_map(|node| {
                let &(cell, position) = cells.get(&node)?;
                Some(PlacedVertex {
                    name: graph[node].clone(),
                    cell,
                    position,
                })
            })
            .collect();
        let edges = graph
            .edge_indices()
            .filter_map(|edge| {
                let (from, to) = graph.edge_endpoints(edge)?;
                Some(RoutedEdge {
                    from: graph[from].clone(),
                    to: graph[to].clone(),
                    articulations: articulations.remove(&edge).unwrap_or_default(),
                })
            })
            .collect();

        Self {
            rows,
            columns,
            vertices,
            edges,
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}
