use crate::error::{BlockadeError, Result};
use crate::{NodeId, Weight};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weighted directed edge; `w` is the activation probability of u -> v.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub w: Weight,
}

impl Edge {
    pub fn new(u: NodeId, v: NodeId, w: Weight) -> Self {
        Self { u, v, w }
    }
}

/// Plain node/edge listing used for (de)serialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<Edge>,
}

/// Directed graph with independent-cascade edge probabilities.
///
/// Nodes keep their insertion order, which is also the row/column order of
/// [`Graph::adjacency_matrix`]. Adding an edge that already exists replaces
/// its weight.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    out: Vec<Vec<(usize, Weight)>>,
    in_degree: Vec<usize>,
    num_edges: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}

impl Graph {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            out: Vec::new(),
            in_degree: Vec::new(),
            num_edges: 0,
        }
    }

    /// Build a graph from an explicit node list and edges between them.
    pub fn new(nodes: Vec<NodeId>, edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut g = Self::empty();
        for id in nodes {
            if !g.add_node(id) {
                return Err(BlockadeError::DuplicateNode(id));
            }
        }
        for e in edges {
            if !g.contains(e.u) || !g.contains(e.v) {
                return Err(BlockadeError::UnknownEndpoint { u: e.u, v: e.v });
            }
            g.add_edge(e.u, e.v, e.w)?;
        }
        Ok(g)
    }

    /// Build a graph whose nodes are the edge endpoints in first-seen order.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut g = Self::empty();
        for e in edges {
            g.add_edge(e.u, e.v, e.w)?;
        }
        Ok(g)
    }

    /// Insert a node; returns false if it was already present.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(id);
        self.out.push(Vec::new());
        self.in_degree.push(0);
        true
    }

    /// Insert or reweight u -> v, creating missing endpoints.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, w: Weight) -> Result<()> {
        check_weight(u, v, w)?;
        self.add_node(u);
        self.add_node(v);
        let (iu, iv) = (self.index[&u], self.index[&v]);

        if let Some(slot) = self.out[iu].iter_mut().find(|(t, _)| *t == iv) {
            slot.1 = w;
            return Ok(());
        }
        self.out[iu].push((iv, w));
        self.in_degree[iv] += 1;
        self.num_edges += 1;
        Ok(())
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn node_at(&self, idx: usize) -> NodeId {
        self.nodes[idx]
    }

    /// Out-neighbours of the node at `idx`, as (index, weight) pairs.
    pub fn successors_by_index(&self, idx: usize) -> &[(usize, Weight)] {
        self.out.get(idx).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn weight(&self, u: NodeId, v: NodeId) -> Option<Weight> {
        let (iu, iv) = (self.index_of(u)?, self.index_of(v)?);
        self.out[iu].iter().find(|(t, _)| *t == iv).map(|&(_, w)| w)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.index_of(id).map(|i| self.out[i].len()).unwrap_or(0)
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.index_of(id).map(|i| self.in_degree[i]).unwrap_or(0)
    }

    /// In-degree plus out-degree.
    pub fn degree(&self, id: NodeId) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.out.iter().enumerate().flat_map(move |(iu, targets)| {
            targets
                .iter()
                .map(move |&(iv, w)| Edge::new(self.nodes[iu], self.nodes[iv], w))
        })
    }

    /// Rewrite every edge weight, re-validating the [0, 1] invariant.
    ///
    /// All new weights are checked before any is written, so on error the
    /// graph keeps its previous weights.
    pub fn map_weights<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(NodeId, NodeId, Weight) -> Weight,
    {
        let mut staged = Vec::with_capacity(self.out.len());
        for (iu, targets) in self.out.iter().enumerate() {
            let u = self.nodes[iu];
            let row = targets
                .iter()
                .map(|&(iv, w)| {
                    let v = self.nodes[iv];
                    let w = f(u, v, w);
                    check_weight(u, v, w).map(|()| w)
                })
                .collect::<Result<Vec<_>>>()?;
            staged.push(row);
        }

        for (targets, row) in self.out.iter_mut().zip(staged) {
            for (slot, w) in targets.iter_mut().zip(row) {
                slot.1 = w;
            }
        }
        Ok(())
    }

    /// Dense weighted adjacency matrix in node order: `F[i][j]` is the weight
    /// of edge i -> j, zero when absent.
    pub fn adjacency_matrix(&self) -> DMatrix<f64> {
        let n = self.nodes.len();
        let mut f = DMatrix::zeros(n, n);
        for (i, targets) in self.out.iter().enumerate() {
            for &(j, w) in targets {
                f[(i, j)] = w;
            }
        }
        f
    }

    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.clone(),
            edges: self.edges().collect(),
        }
    }
}

fn check_weight(u: NodeId, v: NodeId, w: Weight) -> Result<()> {
    if w.is_finite() && (0.0..=1.0).contains(&w) {
        Ok(())
    } else {
        Err(BlockadeError::InvalidWeight { u, v, w })
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = BlockadeError;

    fn try_from(data: GraphData) -> Result<Self> {
        Graph::new(data.nodes, data.edges)
    }
}

impl From<Graph> for GraphData {
    fn from(g: Graph) -> Self {
        g.to_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        Graph::from_edges(vec![
            Edge::new(0, 1, 1.0),
            Edge::new(1, 2, 0.5),
            Edge::new(2, 3, 0.25),
        ])
        .unwrap()
    }

    #[test]
    fn test_chain_structure() {
        let g = chain();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.nodes(), &[0, 1, 2, 3]);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.weight(1, 2), Some(0.5));
        assert_eq!(g.weight(2, 1), None);
    }

    #[test]
    fn test_duplicate_edge_reweights() {
        let mut g = chain();
        g.add_edge(0, 1, 0.3).unwrap();
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.in_degree(1), 1);
        assert_eq!(g.weight(0, 1), Some(0.3));
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert!(matches!(
            Graph::from_edges(vec![Edge::new(0, 1, 1.5)]),
            Err(BlockadeError::InvalidWeight { .. })
        ));
        assert!(matches!(
            Graph::from_edges(vec![Edge::new(0, 1, f64::NAN)]),
            Err(BlockadeError::InvalidWeight { .. })
        ));
        let mut g = chain();
        assert!(g.map_weights(|_, _, w| w - 0.6).is_err());
    }

    #[test]
    fn test_failed_map_weights_leaves_graph_untouched() {
        let mut g = chain();
        // halves the first two edges, then trips on 2 -> 3
        let err = g
            .map_weights(|u, _, w| if u == 2 { 1.5 } else { w * 0.5 })
            .unwrap_err();
        assert_eq!(err, BlockadeError::InvalidWeight { u: 2, v: 3, w: 1.5 });
        assert_eq!(g.weight(0, 1), Some(1.0));
        assert_eq!(g.weight(1, 2), Some(0.5));
        assert_eq!(g.weight(2, 3), Some(0.25));

        g.map_weights(|_, _, w| w * 0.5).unwrap();
        assert_eq!(g.weight(0, 1), Some(0.5));
        assert_eq!(g.weight(2, 3), Some(0.125));
    }

    #[test]
    fn test_explicit_nodes_validation() {
        assert_eq!(
            Graph::new(vec![1, 1], vec![]).unwrap_err(),
            BlockadeError::DuplicateNode(1)
        );
        assert_eq!(
            Graph::new(vec![1, 2], vec![Edge::new(1, 7, 0.5)]).unwrap_err(),
            BlockadeError::UnknownEndpoint { u: 1, v: 7 }
        );
    }

    #[test]
    fn test_adjacency_matrix_follows_node_order() {
        let g = Graph::new(vec![3, 2, 1, 0], chain().edges()).unwrap();
        let f = g.adjacency_matrix();
        // row of node 2 (index 1) points at node 3 (index 0)
        assert_eq!(f[(1, 0)], 0.25);
        assert_eq!(f[(3, 2)], 1.0);
        assert_eq!(f.iter().filter(|w| **w > 0.0).count(), 3);
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let g = Graph::new(vec![9, 4, 7], vec![Edge::new(9, 7, 0.1)]).unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes(), &[9, 4, 7]);
        assert_eq!(back.weight(9, 7), Some(0.1));

        let bad = r#"{"nodes":[0],"edges":[{"u":0,"v":0,"w":2.0}]}"#;
        assert!(serde_json::from_str::<Graph>(bad).is_err());
    }
}
