use super::Cell;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Handle into the [`NodeArena`] of one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) struct SearchNode {
    pub(crate) position: Cell,
    pub(crate) parent: Option<NodeId>, // None only for the start node
    pub(crate) g_cost: f64,
    pub(crate) h_cost: f64, // depends on position and goal only, never updated
}

impl SearchNode {
    pub(crate) fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }
}

/// Owns every node created by a single run. Dropped with the run.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub(crate) fn alloc(&mut self, node: SearchNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

// Open List Key
#[derive(Debug, Clone, Copy)]
struct OpenKey {
    f_cost: f64,
    h_cost: f64,
    id: NodeId,
    position: Cell,
}

impl OpenKey {
    fn of(id: NodeId, node: &SearchNode) -> Self {
        OpenKey {
            f_cost: node.f_cost(),
            h_cost: node.h_cost,
            id,
            position: node.position,
        }
    }
}

impl PartialEq for OpenKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenKey {}

impl PartialOrd for OpenKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            // Closer to the goal wins a tie on f
            .then_with(|| self.h_cost.total_cmp(&other.h_cost))
            // Earlier discovered node wins, an in-place update keeps its id
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Frontier ordered by `(f, h, discovery order)` with at most one node per cell.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    order: BTreeSet<OpenKey>,
    index: HashMap<Cell, OpenKey>,
}

impl OpenSet {
    pub(crate) fn insert(&mut self, id: NodeId, node: &SearchNode) {
        let key = OpenKey::of(id, node);
        if let Some(old) = self.index.insert(node.position, key) {
            self.order.remove(&old);
        }
        self.order.insert(key);
    }

    pub(crate) fn get(&self, position: Cell) -> Option<NodeId> {
        self.index.get(&position).map(|key| key.id)
    }

    /// Re-sort `id` after its costs were changed in the arena.
    pub(crate) fn reprioritize(&mut self, id: NodeId, node: &SearchNode) {
        self.insert(id, node);
    }

    pub(crate) fn pop_first(&mut self) -> Option<NodeId> {
        let key = self.order.pop_first()?;
        self.index.remove(&key.position);
        Some(key.id)
    }

    pub(crate) fn positions(&self) -> Vec<Cell> {
        self.order.iter().map(|key| key.position).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Finalized cells, remembered in the order they were expanded.
#[derive(Debug, Default)]
pub(crate) struct ClosedSet {
    members: HashSet<Cell>,
    order: Vec<Cell>,
}

impl ClosedSet {
    pub(crate) fn insert(&mut self, position: Cell) -> bool {
        let inserted = self.members.insert(position);
        if inserted {
            self.order.push(position);
        }
        inserted
    }

    pub(crate) fn contains(&self, position: Cell) -> bool {
        self.members.contains(&position)
    }

    pub(crate) fn positions(&self) -> Vec<Cell> {
        self.order.clone()
    }
}
