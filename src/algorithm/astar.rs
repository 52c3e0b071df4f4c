use super::distance::{distance, heuristic, neighbors};
use super::{construct_path, WalkabilityOracle};
use crate::common::{
    Cell, ClosedSet, CornerCutting, Metric, NodeArena, NodeId, OpenSet, PathResult, SearchConfig,
    SearchNode, SearchSnapshot,
};
use crate::error::{Endpoint, SearchError};
use crate::stat::Stats;

use std::iter::FusedIterator;
use std::time::Instant;
use tracing::{debug, debug_span, instrument, trace, warn, Span};

/// Outcome of a single [`SearchRun::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `Cell` was popped from the open set and closed.
    Expanded(Cell),
    Finished(PathResult),
}

#[derive(Debug)]
enum RunState {
    Expanding,
    Done(PathResult),
}

/// State of one A* invocation.
///
/// Every node, the open set and the closed set belong to the run and are
/// released together when it is dropped, whether it finished or not.
#[derive(Debug)]
pub struct SearchRun<'a, O> {
    oracle: &'a O,
    config: SearchConfig,
    start: Cell,
    end: Cell,
    arena: NodeArena,
    open: OpenSet,
    closed: ClosedSet,
    // Closed node whose goal test and neighbor relaxation are still due.
    pending: Option<NodeId>,
    state: RunState,
    stats: Stats,
}

impl<'a, O: WalkabilityOracle> SearchRun<'a, O> {
    pub fn new(oracle: &'a O, config: SearchConfig, start: Cell, end: Cell) -> Self {
        let mut arena = NodeArena::default();
        let mut open = OpenSet::default();

        let start_id = arena.alloc(SearchNode {
            position: start,
            parent: None,
            g_cost: 0.0,
            h_cost: heuristic(&config, start, end),
        });
        open.insert(start_id, arena.get(start_id));

        SearchRun {
            oracle,
            config,
            start,
            end,
            arena,
            open,
            closed: ClosedSet::default(),
            pending: None,
            state: RunState::Expanding,
            stats: Stats {
                generated_nodes: 1,
                ..Stats::default()
            },
        }
    }

    /// Advance by exactly one loop iteration.
    ///
    /// Returns `None` once the terminal [`Step::Finished`] has been handed out.
    pub fn step(&mut self) -> Option<Step> {
        if matches!(self.state, RunState::Done(_)) {
            return None;
        }
        let step_start_time = Instant::now();
        let step = self.advance();
        self.stats.time_us += step_start_time.elapsed().as_micros() as u64;
        Some(step)
    }

    /// Drive the loop to the end and return its result.
    pub fn run_to_end(&mut self) -> PathResult {
        while let Some(step) = self.step() {
            if let Step::Finished(result) = step {
                return result;
            }
        }
        self.result().cloned().unwrap_or(PathResult::NotFound)
    }

    fn advance(&mut self) -> Step {
        if let Some(current) = self.pending.take() {
            if self.arena.get(current).position == self.end {
                let result = PathResult::Found(construct_path(&self.arena, current));
                return self.finish(result);
            }
            self.expand(current);
        }

        let Some(current) = self.open.pop_first() else {
            return self.finish(PathResult::NotFound);
        };

        let position = self.arena.get(current).position;
        self.closed.insert(position);
        self.stats.expanded_nodes += 1;
        self.pending = Some(current);
        trace!(
            "expand node: {position:?}, open list size: {}",
            self.open.len()
        );
        Step::Expanded(position)
    }

    fn expand(&mut self, current: NodeId) {
        let position = self.arena.get(current).position;
        for neighbor in neighbors(self.oracle, position, &self.config) {
            if self.closed.contains(neighbor) {
                continue;
            }
            self.relax(current, neighbor);
        }
    }

    fn relax(&mut self, current: NodeId, neighbor: Cell) {
        let current_node = self.arena.get(current);
        let tentative_g_cost =
            current_node.g_cost + distance(&self.config, current_node.position, neighbor);

        match self.open.get(neighbor) {
            None => {
                let id = self.arena.alloc(SearchNode {
                    position: neighbor,
                    parent: Some(current),
                    g_cost: tentative_g_cost,
                    h_cost: heuristic(&self.config, neighbor, self.end),
                });
                self.open.insert(id, self.arena.get(id));
                self.stats.generated_nodes += 1;
            }
            Some(id) if tentative_g_cost < self.arena.get(id).g_cost => {
                let node = self.arena.get_mut(id);
                node.parent = Some(current);
                node.g_cost = tentative_g_cost;
                self.open.reprioritize(id, self.arena.get(id));
                self.stats.updated_nodes += 1;
            }
            Some(_) => {}
        }
    }

    fn finish(&mut self, result: PathResult) -> Step {
        debug!(
            "search {:?} -> {:?} finished: {}, expanded {} of {} nodes",
            self.start,
            self.end,
            result.summary(),
            self.stats.expanded_nodes,
            self.arena.len()
        );
        self.state = RunState::Done(result.clone());
        Step::Finished(result)
    }

    pub fn result(&self) -> Option<&PathResult> {
        match &self.state {
            RunState::Expanding => None,
            RunState::Done(result) => Some(result),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.result().is_some()
    }

    pub fn open_positions(&self) -> Vec<Cell> {
        self.open.positions()
    }

    pub fn closed_positions(&self) -> Vec<Cell> {
        self.closed.positions()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

/// Lazy, pull-based view of a search run.
///
/// Pulling the next snapshot performs one more iteration of the loop; the
/// last element is always [`SearchSnapshot::Finished`]. Dropping the iterator
/// early abandons the run. Each pull runs inside the `find_path_stepwise`
/// span, so per-node events stay attributed to their query.
#[derive(Debug)]
pub struct Stepwise<'a, O> {
    run: SearchRun<'a, O>,
    step: usize,
    span: Span,
}

impl<'a, O: WalkabilityOracle> Stepwise<'a, O> {
    pub fn run(&self) -> &SearchRun<'a, O> {
        &self.run
    }

    pub fn stats(&self) -> &Stats {
        self.run.stats()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl<'a, O: WalkabilityOracle> Iterator for Stepwise<'a, O> {
    type Item = SearchSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        let _entered = self.span.enter();
        let snapshot = match self.run.step()? {
            Step::Expanded(current) => {
                self.step += 1;
                SearchSnapshot::Expanded {
                    step: self.step,
                    current,
                    open: self.run.open_positions(),
                    closed: self.run.closed_positions(),
                }
            }
            Step::Finished(result) => SearchSnapshot::Finished {
                result,
                open: self.run.open_positions(),
                closed: self.run.closed_positions(),
            },
        };
        Some(snapshot)
    }
}

impl<'a, O: WalkabilityOracle> FusedIterator for Stepwise<'a, O> {}

/// A* engine bound to one grid.
///
/// Holds no per-run state: every call builds its own [`SearchRun`] from a copy
/// of the current configuration, so changing the configuration never affects
/// a run that already started.
#[derive(Debug, Clone)]
pub struct PathSearch<O> {
    oracle: O,
    config: SearchConfig,
}

impl<O: WalkabilityOracle> PathSearch<O> {
    pub fn new(oracle: O, config: SearchConfig) -> Self {
        PathSearch { oracle, config }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_allow_diagonal(&mut self, allow: bool) {
        self.config.allow_diagonal = allow;
    }

    /// Select the distance metric, which also fixes the movement set:
    /// Euclidean enables diagonal moves, Manhattan disables them.
    pub fn set_heuristic_mode(&mut self, metric: Metric) {
        self.config.allow_diagonal = metric == Metric::Euclidean;
    }

    pub fn set_corner_cutting(&mut self, policy: CornerCutting) {
        self.config.corner_cutting = policy;
    }

    pub fn find_path_sync(&self, start: Cell, end: Cell) -> PathResult {
        self.find_path_sync_with_stats(start, end).0
    }

    #[instrument(skip_all, name = "find_path_sync", fields(start = format!("{:?}", start), end = format!("{:?}", end)), level = "debug")]
    pub fn find_path_sync_with_stats(&self, start: Cell, end: Cell) -> (PathResult, Stats) {
        let mut run = SearchRun::new(&self.oracle, self.config, start, end);
        let result = run.run_to_end();
        (result, run.stats().clone())
    }

    pub fn find_path_stepwise(&self, start: Cell, end: Cell) -> Stepwise<'_, O> {
        let span = debug_span!("find_path_stepwise", start = ?start, end = ?end);
        let run = span.in_scope(|| {
            debug!("stepwise search with config {:?}", self.config);
            SearchRun::new(&self.oracle, self.config, start, end)
        });
        Stepwise { run, step: 0, span }
    }

    /// Like [`find_path_sync`](Self::find_path_sync), but rejects endpoints
    /// that are out of bounds or blocked instead of reporting `NotFound`.
    pub fn find_path(&self, start: Cell, end: Cell) -> Result<PathResult, SearchError> {
        self.validate_endpoints(start, end)?;
        Ok(self.find_path_sync(start, end))
    }

    pub fn find_path_stepwise_checked(
        &self,
        start: Cell,
        end: Cell,
    ) -> Result<Stepwise<'_, O>, SearchError> {
        self.validate_endpoints(start, end)?;
        Ok(self.find_path_stepwise(start, end))
    }

    /// Reject endpoints outside the grid or on an obstacle.
    pub fn validate_endpoints(&self, start: Cell, end: Cell) -> Result<(), SearchError> {
        for (endpoint, cell) in [(Endpoint::Start, start), (Endpoint::End, end)] {
            if !self.oracle.in_bounds(cell.0, cell.1) || !self.oracle.is_walkable(cell.0, cell.1) {
                warn!("reject query {start:?} -> {end:?}: {endpoint} {cell:?} is not walkable");
                return Err(SearchError::InvalidEndpoint { endpoint, cell });
            }
        }
        Ok(())
    }
}
