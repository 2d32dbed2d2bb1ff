use super::state::{DagEdge, EdgeKind, LayoutState};
use crate::cancel::{CancelToken, Cancelled};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    NotVisited,
    InStack,
    Finished,
}

/// Classify every edge with an iterative depth-first traversal
///
/// The traversal starts at the entry node, then restarts from every node that
/// was never reached, in node id order. Each node records the successors it
/// reached in `dag_edges`, cycle-closing edges tagged as [`EdgeKind::Back`].
/// `state.sorted` receives the nodes in finish order, which is a reversed
/// topological order once back edges are ignored.
pub(crate) fn classify(state: &mut LayoutState, cancel: &CancelToken) -> Result<(), Cancelled> {
    let node_count = state.nodes.len();
    let mut visited = vec![Visit::NotVisited; node_count];
    let mut sorted = Vec::with_capacity(node_count);
    // (node, index of the next outgoing edge to examine)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let roots = std::iter::once(state.entry).chain(0..node_count);
    for root in roots {
        if root >= node_count || visited[root] != Visit::NotVisited {
            continue;
        }

        visited[root] = Visit::InStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            cancel.check()?;

            let (node, edge_index) = *frame;
            let Some(&edge) = state.out_edges[node].get(edge_index) else {
                stack.pop();
                visited[node] = Visit::Finished;
                sorted.push(node);
                continue;
            };
            frame.1 += 1;

            let target = state.edges[edge].to;
            let kind = match visited[target] {
                Visit::NotVisited => {
                    visited[target] = Visit::InStack;
                    stack.push((target, 0));
                    EdgeKind::Forward
                }
                Visit::Finished => EdgeKind::Forward,
                Visit::InStack => EdgeKind::Back,
            };
            state.nodes[node].dag_edges.push(DagEdge { target, kind });
        }
    }

    debug!("Classified {} nodes, finish order {:?}", node_count, sorted);
    state.sorted = sorted;
    Ok(())
}
