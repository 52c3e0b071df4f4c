use grid_astar::map::Map;
use grid_astar::scenario::Scenario;
use grid_astar::{
    Cell, CornerCutting, Endpoint, Metric, PathResult, PathSearch, SearchConfig, SearchError,
    SearchSnapshot, WalkabilityOracle,
};

use std::collections::HashSet;

/// Oracle backed by a set of blocked cells, independent of `Map`.
struct Blocked {
    rows: usize,
    cols: usize,
    blocked: HashSet<Cell>,
}

impl WalkabilityOracle for Blocked {
    fn is_walkable(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && !self.blocked.contains(&(row, col))
    }

    fn bounds(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

#[test]
fn test_custom_oracle() {
    let oracle = Blocked {
        rows: 5,
        cols: 5,
        blocked: HashSet::from([(1, 1), (2, 1), (3, 1), (1, 3), (2, 3), (3, 3)]),
    };
    let mut search = PathSearch::new(oracle, SearchConfig::new(false));
    assert_eq!(search.find_path_sync((2, 0), (2, 4)).len(), 9);

    // Both walls still have to be passed along the top or bottom row.
    search.set_heuristic_mode(Metric::Euclidean);
    assert_eq!(search.find_path_sync((2, 0), (2, 4)).len(), 7);
}

#[test]
fn test_maze_stepwise_matches_sync() {
    let map = Map::from_file("map_file/test/maze.map").unwrap();
    for config in [
        SearchConfig::new(false),
        SearchConfig::new(true),
        SearchConfig {
            allow_diagonal: true,
            corner_cutting: CornerCutting::Forbid,
        },
    ] {
        let search = PathSearch::new(&map, config);
        for (start, end) in [((0, 0), (4, 4)), ((7, 4), (6, 11)), ((4, 5), (0, 11))] {
            let sync = search.find_path(start, end).unwrap();
            assert!(sync.is_found(), "{start:?} -> {end:?} with {config:?}");

            let snapshots: Vec<SearchSnapshot> = search.find_path_stepwise(start, end).collect();
            let expanded = snapshots.len() - 1;
            assert!(snapshots[..expanded]
                .iter()
                .all(|snapshot| snapshot.result().is_none()));
            assert_eq!(snapshots.last().and_then(SearchSnapshot::result), Some(&sync));
        }
    }
}

#[test]
fn test_maze_shortest_lengths() {
    let map = Map::from_file("map_file/test/maze.map").unwrap();
    let search = PathSearch::new(&map, SearchConfig::new(false));

    // Corridor up from the bottom edge.
    assert_eq!(search.find_path_sync((7, 4), (4, 4)).len(), 4);
    assert_eq!(search.find_path_sync((0, 0), (6, 0)).len(), 7);
}

#[test]
fn test_invalid_endpoints_are_distinct_from_no_path() {
    let map = Map::parse(
        "\
..@..
..@..
..@..",
    )
    .unwrap();
    let search = PathSearch::new(&map, SearchConfig::new(true));

    assert_eq!(search.find_path((0, 0), (0, 4)), Ok(PathResult::NotFound));
    assert_eq!(
        search.find_path((0, 0), (0, 2)),
        Err(SearchError::InvalidEndpoint {
            endpoint: Endpoint::End,
            cell: (0, 2),
        })
    );
}

#[test]
fn test_scenario_batch() {
    let map = Map::from_file("map_file/test/test.map").unwrap();
    let scenario = Scenario::load("map_file/test/test.scen").unwrap();
    let search = PathSearch::new(&map, SearchConfig::new(false));

    let lengths: Vec<usize> = scenario
        .routes
        .iter()
        .map(|route| search.find_path(route.start, route.goal).unwrap().len())
        .collect();
    assert_eq!(lengths, vec![5, 4]);
}

#[test]
fn test_abandoned_stepwise_run() {
    let map = Map::parse(&vec!["........"; 8].join("\n")).unwrap();
    let search = PathSearch::new(&map, SearchConfig::new(false));

    let taken: Vec<_> = search.find_path_stepwise((0, 0), (7, 7)).take(3).collect();
    assert_eq!(taken.len(), 3);
    assert!(taken.iter().all(|snapshot| snapshot.result().is_none()));

    // A fresh run is unaffected by the abandoned one.
    assert_eq!(search.find_path_sync((0, 0), (7, 7)).len(), 15);
}
