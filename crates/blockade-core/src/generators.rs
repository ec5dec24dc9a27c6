//! Synthetic undirected skeletons plus the direction and weight assignment
//! that turn them into cascade graphs.

use crate::error::{BlockadeError, Result};
use crate::{Graph, NodeId, RngStream};

/// Undirected node/edge listing over nodes `0..n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    pub n: usize,
    pub pairs: Vec<(NodeId, NodeId)>,
}

/// 0 - 1 - ... - (n-1)
pub fn path(n: usize) -> Skeleton {
    let pairs = (1..n).map(|i| (i - 1, i)).collect();
    Skeleton { n, pairs }
}

/// Hub 0 joined to leaves `1..=leaves`.
pub fn star(leaves: usize) -> Skeleton {
    let pairs = (1..=leaves).map(|i| (0, i)).collect();
    Skeleton { n: leaves + 1, pairs }
}

/// 4-connected `width x height` lattice, row-major ids.
pub fn grid(width: usize, height: usize) -> Skeleton {
    let mut pairs = Vec::new();
    for i in 0..height {
        for j in 0..width {
            let id = i * width + j;
            if j + 1 < width {
                pairs.push((id, id + 1));
            }
            if i + 1 < height {
                pairs.push((id, id + width));
            }
        }
    }
    Skeleton { n: width * height, pairs }
}

/// Erdős–Rényi G(n, p).
pub fn binomial(n: usize, p: f64, rng: &mut RngStream) -> Result<Skeleton> {
    if !(0.0..=1.0).contains(&p) {
        return Err(BlockadeError::InvalidParameter {
            name: "p",
            reason: format!("{p} is not a probability"),
        });
    }
    let mut pairs = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.bernoulli(p) {
                pairs.push((u, v));
            }
        }
    }
    Ok(Skeleton { n, pairs })
}

impl Skeleton {
    /// Directed graph with unit weights. With `both_directions` every pair
    /// becomes two arcs; otherwise each pair gets one arc of random direction.
    pub fn orient(&self, both_directions: bool, rng: &mut RngStream) -> Result<Graph> {
        let mut g = Graph::empty();
        for id in 0..self.n {
            g.add_node(id);
        }
        for &(a, b) in &self.pairs {
            if both_directions {
                g.add_edge(a, b, 1.0)?;
                g.add_edge(b, a, 1.0)?;
            } else if rng.uniform() < 0.5 {
                g.add_edge(a, b, 1.0)?;
            } else {
                g.add_edge(b, a, 1.0)?;
            }
        }
        Ok(g)
    }
}

/// Set every weight to `weight_scale`, or to `U(0,1) * weight_scale` when
/// `random_weight` is set. Results are clamped into [0, 1].
pub fn assign_weights(
    graph: &mut Graph,
    weight_scale: f64,
    random_weight: bool,
    rng: &mut RngStream,
) -> Result<()> {
    if !weight_scale.is_finite() || weight_scale < 0.0 {
        return Err(BlockadeError::InvalidParameter {
            name: "weight_scale",
            reason: format!("{weight_scale} must be a non-negative number"),
        });
    }
    graph.map_weights(|_, _, _| {
        let w = if random_weight {
            rng.uniform() * weight_scale
        } else {
            weight_scale
        };
        w.clamp(0.0, 1.0)
    })
}

/// `amount` distinct node ids chosen uniformly as cascade seeds.
pub fn random_seeds(graph: &Graph, amount: usize, rng: &mut RngStream) -> Vec<NodeId> {
    rng.sample_distinct(graph.nodes(), amount)
}
