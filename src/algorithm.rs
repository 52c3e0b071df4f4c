mod astar;
mod distance;

pub use astar::{PathSearch, SearchRun, Step, Stepwise};
pub use distance::{distance, heuristic, neighbors};

use crate::common::{Cell, NodeArena, NodeId};

/// Grid query surface the search runs against.
///
/// Implementations must answer for every coordinate, returning `false` for
/// cells outside `bounds()`.
pub trait WalkabilityOracle {
    fn is_walkable(&self, row: usize, col: usize) -> bool;

    /// `(row_count, col_count)`.
    fn bounds(&self) -> (usize, usize);

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        let (rows, cols) = self.bounds();
        row < rows && col < cols
    }
}

impl<T: WalkabilityOracle + ?Sized> WalkabilityOracle for &T {
    fn is_walkable(&self, row: usize, col: usize) -> bool {
        (**self).is_walkable(row, col)
    }

    fn bounds(&self) -> (usize, usize) {
        (**self).bounds()
    }
}

// Follow parent links back to the start, then flip into start -> end order.
fn construct_path(arena: &NodeArena, mut current: NodeId) -> Vec<Cell> {
    let mut path = vec![arena.get(current).position];
    while let Some(parent) = arena.get(current).parent {
        path.push(arena.get(parent).position);
        current = parent;
    }
    path.reverse();
    path
}
