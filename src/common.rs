mod node;

pub(crate) use node::{ClosedSet, NodeArena, NodeId, OpenSet, SearchNode};

use serde::{Deserialize, Serialize};

/// Grid coordinate as `(row, col)`.
pub type Cell = (usize, usize);

/// Distance used both for the step cost and for the goal estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// `|drow| + |dcol|`, paired with 4-directional movement.
    #[default]
    Manhattan,
    /// `sqrt(drow^2 + dcol^2)`, paired with 8-directional movement.
    Euclidean,
}

impl Metric {
    pub fn distance(self, a: Cell, b: Cell) -> f64 {
        let dr = a.0.abs_diff(b.0) as f64;
        let dc = a.1.abs_diff(b.1) as f64;
        match self {
            Metric::Manhattan => dr + dc,
            Metric::Euclidean => (dr * dr + dc * dc).sqrt(),
        }
    }
}

/// Whether a diagonal step may squeeze between two orthogonal obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CornerCutting {
    #[default]
    Allow,
    /// Reject a diagonal step if either flanking orthogonal cell is blocked.
    Forbid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    pub allow_diagonal: bool,
    #[serde(default)]
    pub corner_cutting: CornerCutting,
}

impl SearchConfig {
    pub fn new(allow_diagonal: bool) -> Self {
        SearchConfig {
            allow_diagonal,
            corner_cutting: CornerCutting::default(),
        }
    }

    // The metric is never chosen independently of the neighbor set.
    pub fn metric(&self) -> Metric {
        if self.allow_diagonal {
            Metric::Euclidean
        } else {
            Metric::Manhattan
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathResult {
    /// Cells from start to end, both inclusive.
    Found(Vec<Cell>),
    NotFound,
}

impl PathResult {
    pub fn path(&self) -> Option<&[Cell]> {
        match self {
            PathResult::Found(path) => Some(path),
            PathResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found(_))
    }

    /// Number of cells on the path, 0 when no path exists.
    pub fn len(&self) -> usize {
        self.path().map_or(0, |path| path.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text the host shows after a search.
    pub fn summary(&self) -> String {
        match self {
            PathResult::Found(path) => format!("Path found! Length: {}", path.len()),
            PathResult::NotFound => "No path found!".to_string(),
        }
    }
}

/// One observation of a stepwise search.
///
/// `Expanded` is produced right after a node moved from the open set to the
/// closed set; `Finished` is always the last element of the sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchSnapshot {
    Expanded {
        step: usize,
        current: Cell,
        /// Frontier positions in retrieval order.
        open: Vec<Cell>,
        /// Finalized positions in expansion order.
        closed: Vec<Cell>,
    },
    Finished {
        result: PathResult,
        open: Vec<Cell>,
        closed: Vec<Cell>,
    },
}

impl SearchSnapshot {
    pub fn open(&self) -> &[Cell] {
        match self {
            SearchSnapshot::Expanded { open, .. } | SearchSnapshot::Finished { open, .. } => open,
        }
    }

    pub fn closed(&self) -> &[Cell] {
        match self {
            SearchSnapshot::Expanded { closed, .. } | SearchSnapshot::Finished { closed, .. } => {
                closed
            }
        }
    }

    pub fn result(&self) -> Option<&PathResult> {
        match self {
            SearchSnapshot::Expanded { .. } => None,
            SearchSnapshot::Finished { result, .. } => Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_distance() {
        assert_eq!(Metric::Manhattan.distance((0, 0), (4, 4)), 8.0);
        assert_eq!(Metric::Manhattan.distance((4, 1), (0, 3)), 6.0);
        assert_eq!(Metric::Euclidean.distance((0, 0), (3, 4)), 5.0);
        assert!((Metric::Euclidean.distance((1, 1), (2, 2)) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_metric_follows_diagonal_flag() {
        assert_eq!(SearchConfig::new(false).metric(), Metric::Manhattan);
        assert_eq!(SearchConfig::new(true).metric(), Metric::Euclidean);
        assert_eq!(SearchConfig::default().corner_cutting, CornerCutting::Allow);
    }

    #[test]
    fn test_path_result_summary() {
        let found = PathResult::Found(vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(found.len(), 3);
        assert_eq!(found.summary(), "Path found! Length: 3");
        assert_eq!(PathResult::NotFound.summary(), "No path found!");
        assert!(PathResult::NotFound.is_empty());
    }
}
