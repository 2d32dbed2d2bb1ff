use super::state::LayoutState;
use crate::cancel::{CancelToken, Cancelled};
use std::cmp::Ordering;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Route { edge: usize },
    Occupy { node: usize },
}

#[derive(Debug, Clone, Copy)]
struct Event {
    row: i32,
    kind: EventKind,
}

impl Event {
    // Route events sort before occupy events on the same row, so a node never
    // blocks the edges that end on its own row
    fn order(&self) -> (i32, u8) {
        match self.kind {
            EventKind::Route { .. } => (self.row, 0),
            EventKind::Occupy { .. } => (self.row, 1),
        }
    }
}

/// Choose the column every edge is routed through
///
/// Sweeps the rows top to bottom, tracking for each column the last row a
/// node occupied it. An edge is routed through its source column, else its
/// target column, when nothing occupies that column below the edge's top row.
/// Otherwise the nearest free column on either side is taken, whichever makes
/// the shorter horizontal detour, with ties going left on even edge ids.
pub(crate) fn assign_main_columns(
    state: &mut LayoutState,
    cancel: &CancelToken,
) -> Result<(), Cancelled> {
    let mut events = Vec::with_capacity(state.nodes.len() + state.edges.len());
    for (node, layout) in state.nodes.iter().enumerate() {
        let row = layout.row as i32;
        events.push(Event {
            row,
            kind: EventKind::Occupy { node },
        });
        for &edge in &state.out_edges[node] {
            let target_row = state.nodes[state.edges[edge].to].row as i32;
            events.push(Event {
                row: row.max(target_row),
                kind: EventKind::Route { edge },
            });
        }
    }
    // Stable, so equal events keep node then edge enumeration order
    events.sort_by_key(Event::order);

    let mut blocked = vec![-1; state.columns];
    for event in events {
        cancel.check()?;
        match event.kind {
            EventKind::Occupy { node } => {
                blocked[state.nodes[node].col as usize] = event.row;
            }
            EventKind::Route { edge } => {
                let main_column = choose_main_column(state, &blocked, edge);
                trace!("Edge {edge} runs through column {main_column}");
                state.edges[edge].main_column = main_column;
            }
        }
    }

    debug!("Assigned main columns to {} edges", state.edges.len());
    Ok(())
}

fn choose_main_column(state: &LayoutState, blocked: &[i32], edge: usize) -> i32 {
    let layout = &state.edges[edge];
    let source = &state.nodes[layout.from];
    let target = &state.nodes[layout.to];
    let col = source.col;
    let target_col = target.col;
    let top_row = source.row.min(target.row) as i32;

    if blocked[col as usize] <= top_row {
        return col;
    }
    if blocked[target_col as usize] <= top_row {
        return target_col;
    }

    let left = nearest_free_left(blocked, col, top_row);
    let right = nearest_free_right(blocked, col, top_row);
    let distance_left = col - left + (target_col - left).abs();
    let distance_right = right - col + (target_col - right).abs();
    match distance_left.cmp(&distance_right) {
        Ordering::Less => left,
        Ordering::Greater => right,
        Ordering::Equal if edge % 2 == 0 => left,
        Ordering::Equal => right,
    }
}

/// Closest column at or left of `col` free above `row`, -1 past the grid
fn nearest_free_left(blocked: &[i32], col: i32, row: i32) -> i32 {
    (0..=col)
        .rev()
        .find(|&c| blocked[c as usize] < row)
        .unwrap_or(-1)
}

/// Closest column at or right of `col` free above `row`, one past the grid
/// when there is none
fn nearest_free_right(blocked: &[i32], col: i32, row: i32) -> i32 {
    let columns = blocked.len() as i32;
    (col..columns)
        .find(|&c| blocked[c as usize] < row)
        .unwrap_or(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::state::test_util::placed;
    use test_log::test;

    fn routed(node_count: usize, edges: &[(usize, usize)]) -> LayoutState {
        let mut state = placed(node_count, edges);
        assign_main_columns(&mut state, &CancelToken::new()).unwrap();
        state
    }

    fn main_columns(state: &LayoutState) -> Vec<i32> {
        state.edges.iter().map(|e| e.main_column).collect()
    }

    #[test]
    fn chain_stays_in_its_column() {
        let state = routed(3, &[(0, 1), (1, 2)]);

        assert_eq!(main_columns(&state), vec![0, 0]);
    }

    #[test]
    fn diamond_edges_leave_from_source_column() {
        let state = routed(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);

        assert_eq!(main_columns(&state), vec![1, 1, 0, 2]);
    }

    #[test]
    fn blocked_source_uses_free_target_column() {
        // 0 -> 3 cannot go straight down through 1
        let state = routed(4, &[(0, 1), (1, 2), (1, 3), (0, 3)]);

        assert_eq!(state.nodes[3].col, 2);
        assert_eq!(main_columns(&state), vec![1, 1, 1, 2]);
    }

    #[test]
    fn tie_on_odd_edge_goes_right() {
        let state = routed(3, &[(0, 1), (0, 2), (1, 2)]);

        assert_eq!(main_columns(&state), vec![0, 1, 0]);
    }

    #[test]
    fn tie_on_even_edge_goes_left_of_grid() {
        let state = routed(3, &[(0, 1), (1, 2), (0, 2)]);

        assert_eq!(main_columns(&state), vec![0, 0, -1]);
    }

    #[test]
    fn back_edge_keeps_source_column() {
        let state = routed(2, &[(0, 1), (1, 0)]);

        assert_eq!(main_columns(&state), vec![0, 0]);
    }

    #[test]
    fn nearest_free_columns() {
        let blocked = [3, -1, 4, 2, 5];

        assert_eq!(nearest_free_left(&blocked, 3, 3), 3);
        assert_eq!(nearest_free_left(&blocked, 2, 3), 1);
        assert_eq!(nearest_free_left(&blocked, 0, 3), -1);
        assert_eq!(nearest_free_right(&blocked, 2, 3), 3);
        assert_eq!(nearest_free_right(&blocked, 4, 3), 5);
    }
}
