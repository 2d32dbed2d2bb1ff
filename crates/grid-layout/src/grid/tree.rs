use super::state::LayoutState;
use crate::cancel::{CancelToken, Cancelled};
use tracing::{debug, trace};

/// Pick a spanning forest out of the dag edges
///
/// Nodes are visited in id order, and a dag edge becomes a tree edge when its
/// target sits exactly one row below and was not claimed yet. Roots of the
/// forest are the nodes left without a parent.
pub(crate) fn select_tree(state: &mut LayoutState, cancel: &CancelToken) -> Result<(), Cancelled> {
    for node in 0..state.nodes.len() {
        cancel.check()?;

        let row = state.nodes[node].row;
        for edge_index in 0..state.nodes[node].dag_edges.len() {
            let target = state.nodes[node].dag_edges[edge_index].target;
            let child = &mut state.nodes[target];
            if !child.has_parent && child.row == row + 1 {
                child.has_parent = true;
                state.nodes[node].tree_edges.push(target);
            }
        }
    }

    debug!(
        "Selected tree with {} roots",
        state.nodes.iter().filter(|n| !n.has_parent).count()
    );
    Ok(())
}

/// Recenter if/else style diamonds on their merge node
///
/// When the tree children of a node have exactly one tree child between them
/// (the merge node), the children converging on it are counted in tree order
/// until the first one that does not reach it. Only a two-way merge is
/// corrected: the converging child holding the tree edge to the merge node is
/// shifted so the merge node ends up between both branches. Wider merges are
/// left alone. Rows and tree edges are untouched.
pub(crate) fn find_merge_points(
    state: &mut LayoutState,
    cancel: &CancelToken,
) -> Result<(), Cancelled> {
    for node in 0..state.nodes.len() {
        cancel.check()?;

        let children = &state.nodes[node].tree_edges;
        let mut merge_node = None;
        let mut grandchild_count = 0;
        for &child in children {
            let grandchildren = &state.nodes[child].tree_edges;
            if let Some(&first) = grandchildren.first() {
                merge_node = Some(first);
            }
            grandchild_count += grandchildren.len();
        }
        let Some(merge_node) = merge_node else {
            continue;
        };
        if grandchild_count != 1 {
            continue;
        }

        let mut converging = 0;
        let mut with_tree_edge = 0;
        for &child in children {
            let child = &state.nodes[child];
            if !child.dag_edges.iter().any(|e| e.target == merge_node) {
                break;
            }
            if child.tree_edges.len() == 1 {
                with_tree_edge = converging;
            }
            converging += 1;
        }

        if converging == 2 {
            let child = children[with_tree_edge];
            let col = with_tree_edge as i32 * 2 - 1;
            trace!("Merge node {merge_node} under {node}: shifting {child} to {col}");
            state.nodes[child].col = col;
        }
    }
    Ok(())
}
