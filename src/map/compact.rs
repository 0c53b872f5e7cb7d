use std::collections::HashMap;

use crate::geometry::MapLocation;
use crate::node::{Cell, NodeId};

/// Structural adjustment applied to a row after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompactionPolicy {
    /// Leave `Cell::Empty` in place. No other node's location changes, so
    /// locators held elsewhere stay valid across the removal.
    #[default]
    LeaveGap,
    /// Shift the cells right of the removed one a column left and append
    /// an empty cell at the row end. Dense layouts keep no interior gaps.
    ShiftLeft,
}

/// Rebuild a row with the cell at `removed` vacated. Index entries for any
/// relocated nodes are updated in the same pass.
pub(crate) fn remove_from_row(
    row: &[Cell],
    removed: MapLocation,
    policy: CompactionPolicy,
    index: &mut HashMap<NodeId, MapLocation>,
) -> Vec<Cell> {
    let col = removed.col as usize;
    match policy {
        CompactionPolicy::LeaveGap => {
            let mut cells = row.to_vec();
            cells[col] = Cell::Empty;
            cells
        }
        CompactionPolicy::ShiftLeft => {
            let mut cells = Vec::with_capacity(row.len());
            cells.extend_from_slice(&row[..col]);
            cells.extend_from_slice(&row[col + 1..]);
            cells.push(Cell::Empty);

            for (new_col, cell) in cells.iter().enumerate().skip(col) {
                if let Some(node) = cell.node() {
                    index.insert(
                        node.id().clone(),
                        MapLocation::new(removed.row, new_col as u16),
                    );
                }
            }
            cells
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ClusterNode, Workspace};

    fn occupied(id: &str) -> Cell {
        Cell::Occupied(ClusterNode::Workspace(Workspace {
            id: id.into(),
            hostname: format!("{id}.cluster.local"),
        }))
    }

    fn seed_index(row: &[Cell]) -> HashMap<NodeId, MapLocation> {
        row.iter()
            .enumerate()
            .filter_map(|(col, cell)| {
                cell.node()
                    .map(|node| (node.id().clone(), MapLocation::new(0, col as u16)))
            })
            .collect()
    }

    #[test]
    fn leave_gap_only_vacates_the_target() {
        let row = vec![occupied("a"), occupied("b"), occupied("c")];
        let mut index = seed_index(&row);
        index.remove("b");

        let cells = remove_from_row(
            &row,
            MapLocation::new(0, 1),
            CompactionPolicy::LeaveGap,
            &mut index,
        );

        assert!(cells[1].is_empty());
        assert_eq!(cells[0].node().unwrap().id(), "a");
        assert_eq!(cells[2].node().unwrap().id(), "c");
        assert_eq!(index.get("c"), Some(&MapLocation::new(0, 2)));
    }

    #[test]
    fn shift_left_relocates_trailing_nodes_and_reindexes() {
        let row = vec![occupied("a"), occupied("b"), occupied("c"), Cell::Empty];
        let mut index = seed_index(&row);
        index.remove("a");

        let cells = remove_from_row(
            &row,
            MapLocation::new(0, 0),
            CompactionPolicy::ShiftLeft,
            &mut index,
        );

        assert_eq!(cells.len(), row.len());
        assert_eq!(cells[0].node().unwrap().id(), "b");
        assert_eq!(cells[1].node().unwrap().id(), "c");
        assert!(cells[2].is_empty());
        assert!(cells[3].is_empty());

        assert_eq!(index.get("b"), Some(&MapLocation::new(0, 0)));
        assert_eq!(index.get("c"), Some(&MapLocation::new(0, 1)));
    }

    #[test]
    fn shift_left_of_last_cell_touches_nothing_else() {
        let row = vec![occupied("a"), occupied("b")];
        let mut index = seed_index(&row);
        index.remove("b");

        let cells = remove_from_row(
            &row,
            MapLocation::new(0, 1),
            CompactionPolicy::ShiftLeft,
            &mut index,
        );

        assert_eq!(cells[0].node().unwrap().id(), "a");
        assert!(cells[1].is_empty());
        assert_eq!(index.get("a"), Some(&MapLocation::new(0, 0)));
    }
}
