use blockade_core::{Graph, RngStream};
use std::collections::{HashMap, VecDeque};

/// One realization of the independent cascade: who got activated, along
/// which edges, and how the active count grew round by round.
#[derive(Clone, Debug)]
pub struct PossibleWorld {
    /// Activation flag per node index.
    active: Vec<bool>,
    /// Activated node indices in activation order (seeds first).
    order: Vec<usize>,
    /// Successful activation edges, keyed by source index.
    children: HashMap<usize, Vec<usize>>,
    /// Rounds until the frontier emptied.
    pub rounds: usize,
    /// Cumulative active count after each round (entry 0 is the seed count).
    pub active_series: Vec<usize>,
}

impl PossibleWorld {
    /// Run the cascade from `seeds` (node indices), flipping one coin per
    /// frontier out-edge.
    pub fn sample(graph: &Graph, seeds: &[usize], rng: &mut RngStream) -> Self {
        let mut active = vec![false; graph.num_nodes()];
        let mut order = Vec::new();
        for &s in seeds {
            if !active[s] {
                active[s] = true;
                order.push(s);
            }
        }

        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut frontier = order.clone();
        let mut active_series = vec![order.len()];
        let mut rounds = 0;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &v in &frontier {
                for &(u, w) in graph.successors_by_index(v) {
                    // every node activated this round is still inactive here,
                    // so parallel activations all keep their edge
                    if rng.bernoulli(w) && !active[u] {
                        children.entry(v).or_default().push(u);
                        next.push(u);
                    }
                }
            }
            next.sort_unstable();
            next.dedup();
            for &u in &next {
                active[u] = true;
                order.push(u);
            }
            active_series.push(order.len());
            frontier = next;
            rounds += 1;
        }

        Self {
            active,
            order,
            children,
            rounds,
            active_series,
        }
    }

    pub fn active_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active.get(idx).copied().unwrap_or(false)
    }

    /// Activated node indices, seeds first.
    pub fn activated(&self) -> &[usize] {
        &self.order
    }

    /// Number of nodes still reached from the seeds once `blocked` nodes are
    /// cut out of the active subgraph.
    ///
    /// Seeds always count as reached; a blocked seed simply does not pass the
    /// cascade on.
    pub fn reachable_without(&self, seeds: &[usize], blocked: &[bool]) -> usize {
        let is_blocked = |i: usize| blocked.get(i).copied().unwrap_or(false);
        let mut seen = vec![false; self.active.len()];
        let mut queue = VecDeque::new();
        let mut reached = 0;

        for &s in seeds {
            if seen[s] {
                continue;
            }
            seen[s] = true;
            reached += 1;
            if !is_blocked(s) {
                queue.push_back(s);
            }
        }

        while let Some(v) = queue.pop_front() {
            let Some(targets) = self.children.get(&v) else {
                continue;
            };
            for &u in targets {
                if !seen[u] && !is_blocked(u) {
                    seen[u] = true;
                    reached += 1;
                    queue.push_back(u);
                }
            }
        }

        reached
    }
}
