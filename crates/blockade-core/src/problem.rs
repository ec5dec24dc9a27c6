use crate::error::{BlockadeError, Result};
use crate::{Graph, NodeId};
use std::collections::HashSet;

/// A validated blocking instance: graph, seed set and budget.
///
/// Construction enforces every configuration invariant, so solvers can take a
/// `Problem` and skip their own checks.
#[derive(Clone, Debug)]
pub struct Problem {
    graph: Graph,
    seeds: Vec<NodeId>,
    seed_set: HashSet<NodeId>,
    k: usize,
}

impl Problem {
    pub fn new(graph: Graph, seeds: impl IntoIterator<Item = NodeId>, k: usize) -> Result<Self> {
        if graph.is_empty() {
            return Err(BlockadeError::EmptyGraph);
        }

        let mut seed_set = HashSet::new();
        let seeds: Vec<NodeId> = seeds.into_iter().filter(|s| seed_set.insert(*s)).collect();
        if seeds.is_empty() {
            return Err(BlockadeError::EmptySeeds);
        }
        if let Some(&missing) = seeds.iter().find(|s| !graph.contains(**s)) {
            return Err(BlockadeError::UnknownSeed(missing));
        }

        let available = graph.num_nodes() - seeds.len();
        if k > available {
            return Err(BlockadeError::BudgetTooLarge { k, available });
        }
        if k == 0 {
            return Err(BlockadeError::ZeroBudget);
        }

        Ok(Self { graph, seeds, seed_set, k })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn seeds(&self) -> &[NodeId] {
        &self.seeds
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_seed(&self, id: NodeId) -> bool {
        self.seed_set.contains(&id)
    }

    /// Non-seed nodes in graph order.
    pub fn candidates(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .iter()
            .copied()
            .filter(|n| !self.is_seed(*n))
            .collect()
    }

    /// True when at least one seed has an outgoing edge; otherwise nothing
    /// can spread and any blocking set is optimal.
    pub fn seeds_can_spread(&self) -> bool {
        self.seeds.iter().any(|s| self.graph.out_degree(*s) > 0)
    }
}
