use super::WalkabilityOracle;
use crate::common::{Cell, CornerCutting, SearchConfig};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)]; // Up, down, left, right
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)]; // Up-left, up-right, down-left, down-right

/// Cost of moving from `a` to the adjacent cell `b`.
pub fn distance(config: &SearchConfig, a: Cell, b: Cell) -> f64 {
    config.metric().distance(a, b)
}

/// Estimate from `from` to `goal`, same metric as [`distance`].
pub fn heuristic(config: &SearchConfig, from: Cell, goal: Cell) -> f64 {
    config.metric().distance(from, goal)
}

fn offset(cell: Cell, (dr, dc): (isize, isize)) -> Option<Cell> {
    Some((
        cell.0.checked_add_signed(dr)?,
        cell.1.checked_add_signed(dc)?,
    ))
}

fn walkable<O: WalkabilityOracle>(oracle: &O, cell: Cell) -> bool {
    oracle.is_walkable(cell.0, cell.1)
}

/// Walkable cells one step away from `cell`, orthogonal directions first.
///
/// Diagonals are only produced when `config.allow_diagonal` is set. With
/// [`CornerCutting::Allow`] a diagonal step is accepted even when both
/// flanking orthogonal cells are blocked.
pub fn neighbors<O: WalkabilityOracle>(oracle: &O, cell: Cell, config: &SearchConfig) -> Vec<Cell> {
    let mut result = Vec::with_capacity(8);

    for &dir in &ORTHOGONAL {
        if let Some(next) = offset(cell, dir) {
            if walkable(oracle, next) {
                result.push(next);
            }
        }
    }

    if !config.allow_diagonal {
        return result;
    }

    for &(dr, dc) in &DIAGONAL {
        let Some(next) = offset(cell, (dr, dc)) else {
            continue;
        };
        if !walkable(oracle, next) {
            continue;
        }
        if config.corner_cutting == CornerCutting::Forbid {
            // Both flanks of a diagonal step are in bounds whenever the target is.
            let flank_row = (next.0, cell.1);
            let flank_col = (cell.0, next.1);
            if !walkable(oracle, flank_row) || !walkable(oracle, flank_col) {
                continue;
            }
        }
        result.push(next);
    }

    result
}
