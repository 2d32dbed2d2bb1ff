use super::state::{LayoutNode, LayoutState};
use crate::cancel::{CancelToken, Cancelled};
use tracing::debug;

/// Width of a node in grid columns
const NODE_WIDTH: i32 = 2;

/// Silhouette of a packed subtree, in the coordinate frame of its first node
#[derive(Debug, Clone)]
struct Contour {
    left: Vec<i32>,
    right: Vec<i32>,
    left_position: i32,
    right_position: i32,
    last_row_left: i32,
    last_row_right: i32,
    row_count: usize,
}

impl Contour {
    fn of(node: &LayoutNode) -> Self {
        Self {
            left: node.left_shape.clone(),
            right: node.right_shape.clone(),
            left_position: node.left_position,
            right_position: node.right_position,
            last_row_left: node.last_row_left,
            last_row_right: node.last_row_right,
            row_count: node.row_count,
        }
    }

    /// Place `child` to the right of this contour without overlapping any row
    ///
    /// Returns the horizontal offset applied to the child's frame.
    fn merge(self, child: &LayoutNode) -> (Self, i32) {
        let shared_rows = self.right.len().min(child.left_shape.len());
        let mut right_edge = 0;
        let mut child_left_edge = 0;
        let mut max_right_edge = 0;
        let mut min_child_left = child.col;
        for (right, left) in self.right.iter().zip(&child.left_shape) {
            right_edge += right;
            child_left_edge += left;
            max_right_edge = max_right_edge.max(right_edge);
            min_child_left = min_child_left.min(child_left_edge);
        }

        let left_is_taller = self.right.len() > shared_rows;
        let child_is_taller = child.left_shape.len() > shared_rows;
        let offset = if left_is_taller {
            max_right_edge - child.left_position
        } else {
            self.right_position - min_child_left
        };

        let mut left = self.left;
        let mut right;
        let mut last_row_left = self.last_row_left;
        let mut last_row_right = self.last_row_right;
        if left_is_taller {
            // Child rows on top, then the rest of the right side re-anchored
            // to the child's last row
            right = child.right_shape.clone();
            right.push(
                self.right[shared_rows] + right_edge - (offset + child.last_row_right),
            );
            right.extend_from_slice(&self.right[shared_rows + 1..]);
        } else if child_is_taller {
            // Left side continues with the child's rows below ours
            left.push(
                child.left_shape[shared_rows] + child_left_edge + offset - self.last_row_left,
            );
            left.extend_from_slice(&child.left_shape[shared_rows + 1..]);
            right = child.right_shape.clone();
            last_row_left = child.last_row_left + offset;
            last_row_right = child.last_row_right + offset;
        } else {
            right = child.right_shape.clone();
            last_row_right = child.last_row_right + offset;
        }
        right[0] += offset;

        let merged = Self {
            left,
            right,
            left_position: self.left_position.min(child.left_position + offset),
            right_position: self.right_position.max(child.right_position + offset),
            last_row_left,
            last_row_right,
            row_count: self.row_count.max(child.row_count),
        };
        (merged, offset)
    }
}

/// Assign columns with a contour based tree packing
///
/// Subtrees are packed bottom-up over the tree edges, children left to right,
/// each parent sitting at the integer mean of its children's columns. Trees
/// rooted on row 0 are then laid side by side, and a final top-down pass turns
/// the parent relative columns into absolute ones.
pub(crate) fn assign_columns(state: &mut LayoutState, cancel: &CancelToken) -> Result<(), Cancelled> {
    for index in 0..state.sorted.len() {
        cancel.check()?;
        let node = state.sorted[index];
        pack_subtree(&mut state.nodes, node);
    }

    let mut next_empty_column = 0;
    let mut roots = 0;
    for node in state.nodes.iter_mut().filter(|n| n.row == 0) {
        cancel.check()?;
        let offset = -node.left_position;
        node.col += next_empty_column + offset;
        next_empty_column += node.right_position + offset;
        roots += 1;
    }

    for index in (0..state.sorted.len()).rev() {
        cancel.check()?;
        let node = state.sorted[index];
        let col = state.nodes[node].col;
        debug_assert!(col >= 0, "node {node} has negative column {col}");
        for child_index in 0..state.nodes[node].tree_edges.len() {
            let child = state.nodes[node].tree_edges[child_index];
            state.nodes[child].col += col;
        }
    }

    state.columns = state
        .nodes
        .iter()
        .map(|n| n.col + NODE_WIDTH)
        .max()
        .map_or(0, |columns| columns.max(0) as usize);
    debug!("Packed {} trees into {} columns", roots, state.columns);
    Ok(())
}

/// Pack the subtree of `node`, whose tree children are already packed
fn pack_subtree(nodes: &mut [LayoutNode], node: usize) {
    let children = nodes[node].tree_edges.clone();
    let Some((&first, rest)) = children.split_first() else {
        let leaf = &mut nodes[node];
        leaf.col = 0;
        leaf.row_count = 1;
        leaf.left_position = 0;
        leaf.right_position = NODE_WIDTH;
        leaf.last_row_left = 0;
        leaf.last_row_right = NODE_WIDTH;
        leaf.left_shape = vec![0];
        leaf.right_shape = vec![NODE_WIDTH];
        return;
    };

    let mut contour = Contour::of(&nodes[first]);
    for &child in rest {
        let (merged, offset) = contour.merge(&nodes[child]);
        nodes[child].col += offset;
        contour = merged;
    }

    // Integer mean, truncated toward zero
    let mean = children.iter().map(|&c| nodes[c].col).sum::<i32>() / children.len() as i32;

    let parent = &mut nodes[node];
    parent.col += mean;
    let col = parent.col;

    let mut left_shape = Vec::with_capacity(contour.left.len() + 1);
    left_shape.push(col);
    left_shape.extend_from_slice(&contour.left);
    left_shape[1] -= col;

    let mut right_shape = Vec::with_capacity(contour.right.len() + 1);
    right_shape.push(col + NODE_WIDTH);
    right_shape.extend_from_slice(&contour.right);
    right_shape[1] -= col + NODE_WIDTH;

    parent.left_shape = left_shape;
    parent.right_shape = right_shape;
    parent.left_position = contour.left_position.min(col);
    parent.right_position = contour.right_position.max(col + NODE_WIDTH);
    parent.last_row_left = contour.last_row_left;
    parent.last_row_right = contour.last_row_right;
    parent.row_count = contour.row_count + 1;
    debug_assert_eq!(parent.left_shape.len(), parent.row_count);
    debug_assert_eq!(parent.right_shape.len(), parent.row_count);

    for &child in &children {
        nodes[child].col -= col;
    }
}
