use super::state::LayoutState;
use crate::cancel::{CancelToken, Cancelled};
use tracing::debug;

/// Assign rows to nodes based on topological order
///
/// Longest-path layering: walking nodes sources first, every forward dag edge
/// pushes its target at least one row below its source. Back edges are left
/// alone so cycles cannot feed back into rows that were already propagated.
pub(crate) fn assign_rows(state: &mut LayoutState, cancel: &CancelToken) -> Result<(), Cancelled> {
    for index in (0..state.sorted.len()).rev() {
        cancel.check()?;

        let node = state.sorted[index];
        let next_row = state.nodes[node].row + 1;
        for edge_index in 0..state.nodes[node].dag_edges.len() {
            let edge = state.nodes[node].dag_edges[edge_index];
            if !edge.is_forward() {
                continue;
            }
            let target = &mut state.nodes[edge.target];
            target.row = target.row.max(next_row);
        }
    }

    state.rows = state.nodes.iter().map(|n| n.row + 1).max().unwrap_or(0);
    debug!("Assigned {} rows", state.rows);
    Ok(())
}
