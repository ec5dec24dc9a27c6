//! Budgeted greedy maximum coverage over a node-set ranking.
//!
//! A ranking maps candidate keys (sets of nodes) to the sample ids they cover.
//! Selecting a key costs one unit per node not already selected; the greedy
//! loop repeatedly takes the key with the best covered weight per unit cost.

use blockade_core::{BlockadeError, NodeId, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

pub type SampleId = usize;
pub type Ranking = BTreeMap<BTreeSet<NodeId>, Vec<SampleId>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorLog {
    pub weighted: bool,
    pub iterations: usize,
}

pub struct SetSelector {
    ranking: Ranking,
    weighted: bool,
    sample_weights: Option<Vec<f64>>,
    node_weights: Option<HashMap<NodeId, f64>>,
    sample_to_node: Option<Vec<NodeId>>,
    log: SelectorLog,
}

impl SetSelector {
    pub fn new(ranking: Ranking, weighted: bool) -> Self {
        Self {
            ranking,
            weighted,
            sample_weights: None,
            node_weights: None,
            sample_to_node: None,
            log: SelectorLog {
                weighted,
                iterations: 0,
            },
        }
    }

    /// Weight every sample directly, indexed by sample id.
    pub fn with_sample_weights(mut self, weights: Vec<f64>) -> Self {
        self.sample_weights = Some(weights);
        self
    }

    /// Per-node weights (e.g. activation probabilities of the sampled nodes).
    pub fn set_sampled_node_weights(&mut self, weights: HashMap<NodeId, f64>) {
        self.node_weights = Some(weights);
    }

    /// Node each sample was drawn for, indexed by sample id.
    pub fn set_sample_to_node_index(&mut self, index: Vec<NodeId>) {
        self.sample_to_node = Some(index);
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    pub fn log(&self) -> &SelectorLog {
        &self.log
    }

    /// Greedily pick keys until `k` nodes are selected or nothing fits.
    pub fn select(&mut self, k: usize) -> Result<BTreeSet<NodeId>> {
        let weights = if self.weighted {
            Some(self.resolve_sample_weights()?)
        } else {
            None
        };

        let mut selected = BTreeSet::new();
        let mut ranking = self.ranking.clone();
        let mut iterations = 0;

        while selected.len() < k {
            iterations += 1;
            ranking = filter_ranking(k, &ranking, &selected);
            let scores = build_scores(&ranking, weights.as_deref())?;
            let Some(best) = best_key(&scores, &selected) else {
                break;
            };
            debug!(iteration = iterations, key = ?best, "selector picked key");
            selected.extend(best.iter().copied());
        }

        self.log = SelectorLog {
            weighted: self.weighted,
            iterations,
        };
        Ok(selected)
    }

    /// Samples covered by at least one key lying entirely inside `blocked`.
    pub fn positive_samples(&self, blocked: &BTreeSet<NodeId>) -> BTreeSet<SampleId> {
        self.ranking
            .iter()
            .filter(|(key, _)| key.is_subset(blocked))
            .flat_map(|(_, samples)| samples.iter().copied())
            .collect()
    }

    /// Positive samples grouped by the node they were drawn for.
    pub fn positive_node_counts(&self, blocked: &BTreeSet<NodeId>) -> Result<BTreeMap<NodeId, usize>> {
        let index = self.sample_index()?;
        let mut counts = BTreeMap::new();
        for sample in self.positive_samples(blocked) {
            *counts.entry(node_of(index, sample)?).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Positive samples per realization after `iteration + 1` realizations.
    pub fn predicted_normalized(&self, iteration: usize, blocked: &BTreeSet<NodeId>) -> f64 {
        self.positive_samples(blocked).len() as f64 / (iteration + 1) as f64
    }

    /// Sum over nodes of (positive share of that node's samples) times the
    /// node's weight.
    pub fn predicted_normalized_per_node(&self, blocked: &BTreeSet<NodeId>) -> Result<f64> {
        let index = self.sample_index()?;
        let node_weights = self.node_weights()?;

        let mut totals: HashMap<NodeId, usize> = HashMap::new();
        for &node in index {
            *totals.entry(node).or_insert(0) += 1;
        }

        let mut result = 0.0;
        for (node, positive) in self.positive_node_counts(blocked)? {
            let total = totals.get(&node).copied().unwrap_or(positive).max(1);
            result += positive as f64 / total as f64 * node_weight(node_weights, node)?;
        }
        Ok(result)
    }

    fn sample_index(&self) -> Result<&[NodeId]> {
        self.sample_to_node
            .as_deref()
            .ok_or_else(|| missing("sample_to_node", "no sample to node index set"))
    }

    fn node_weights(&self) -> Result<&HashMap<NodeId, f64>> {
        self.node_weights
            .as_ref()
            .ok_or_else(|| missing("node_weights", "no sampled node weights set"))
    }

    fn resolve_sample_weights(&self) -> Result<Vec<f64>> {
        if let Some(w) = &self.sample_weights {
            return Ok(w.clone());
        }
        match (&self.node_weights, &self.sample_to_node) {
            (Some(nodes), Some(index)) => index.iter().map(|&n| node_weight(nodes, n)).collect(),
            _ => Err(missing(
                "weights",
                "weighted selection needs sample weights or node weights with a sample index",
            )),
        }
    }
}

fn missing(name: &'static str, reason: &str) -> BlockadeError {
    BlockadeError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

fn node_of(index: &[NodeId], sample: SampleId) -> Result<NodeId> {
    index.get(sample).copied().ok_or_else(|| BlockadeError::InvalidParameter {
        name: "sample_to_node",
        reason: format!("sample {sample} has no node"),
    })
}

fn node_weight(weights: &HashMap<NodeId, f64>, node: NodeId) -> Result<f64> {
    weights.get(&node).copied().ok_or_else(|| BlockadeError::InvalidParameter {
        name: "node_weights",
        reason: format!("node {node} has no weight"),
    })
}

/// Nodes of `key` not yet selected.
fn cost(key: &BTreeSet<NodeId>, selected: &BTreeSet<NodeId>) -> usize {
    key.difference(selected).count()
}

/// Drop keys that no longer fit the remaining budget; keys already covered by
/// the selection retire their samples from every later key.
fn filter_ranking(k: usize, ranking: &Ranking, selected: &BTreeSet<NodeId>) -> Ranking {
    let vacant = k.saturating_sub(selected.len());
    let mut blocked_samples: HashSet<SampleId> = HashSet::new();
    let mut updated = Ranking::new();

    for (key, samples) in ranking {
        if cost(key, selected) > vacant {
            continue;
        }
        if key.is_subset(selected) {
            blocked_samples.extend(samples.iter().copied());
            continue;
        }
        let kept: Vec<SampleId> = samples
            .iter()
            .copied()
            .filter(|s| !blocked_samples.contains(s))
            .collect();
        if !kept.is_empty() {
            updated.insert(key.clone(), kept);
        }
    }
    updated
}

/// Covered weight of each key: distinct samples of every key nested in it,
/// itself included.
fn build_scores<'r>(
    ranking: &'r Ranking,
    weights: Option<&[f64]>,
) -> Result<Vec<(&'r BTreeSet<NodeId>, f64)>> {
    let mut scores = Vec::with_capacity(ranking.len());
    for key in ranking.keys() {
        let mut seen = HashSet::new();
        let mut total = 0.0;
        for (inner, samples) in ranking {
            if !inner.is_subset(key) {
                continue;
            }
            for &s in samples {
                if seen.insert(s) {
                    total += match weights {
                        Some(w) => w.get(s).copied().ok_or_else(|| BlockadeError::InvalidParameter {
                            name: "sample_weights",
                            reason: format!("sample {s} has no weight"),
                        })?,
                        None => 1.0,
                    };
                }
            }
        }
        scores.push((key, total));
    }
    Ok(scores)
}

/// First key with the highest weight per unit cost.
fn best_key<'r>(
    scores: &[(&'r BTreeSet<NodeId>, f64)],
    selected: &BTreeSet<NodeId>,
) -> Option<&'r BTreeSet<NodeId>> {
    let mut best = None;
    let mut best_score = -1.0;
    for &(key, weight) in scores {
        let c = cost(key, selected);
        if c == 0 {
            continue;
        }
        let score = weight / c as f64;
        if score > best_score {
            best_score = score;
            best = Some(key);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(nodes: &[NodeId]) -> BTreeSet<NodeId> {
        nodes.iter().copied().collect()
    }

    fn ranking(entries: &[(&[NodeId], &[SampleId])]) -> Ranking {
        entries.iter().map(|(k, s)| (key(k), s.to_vec())).collect()
    }

    #[test]
    fn test_single_covering_key_is_selected_alone() {
        let r = ranking(&[(&[5, 6], &[0, 1, 2, 3]), (&[5], &[0]), (&[7], &[1])]);
        let mut selector = SetSelector::new(r, false);
        assert_eq!(selector.select(2).unwrap(), key(&[5, 6]));
        assert_eq!(selector.log().iterations, 1);
    }

    #[test]
    fn test_greedy_accounts_for_nested_keys() {
        let r = ranking(&[(&[1], &[0, 1]), (&[2], &[2]), (&[1, 2], &[3])]);
        let mut selector = SetSelector::new(r.clone(), false);
        // {1} and {1,2} tie at 2 per node; key order picks {1} first
        let chosen = selector.select(2).unwrap();
        assert_eq!(chosen, key(&[1, 2]));
        assert_eq!(selector.log().iterations, 2);
        // caller's ranking untouched
        assert_eq!(selector.ranking(), &r);
    }

    #[test]
    fn test_cost_never_exceeds_budget() {
        let r = ranking(&[
            (&[1, 2, 3], &[0, 1, 2, 3, 4, 5]),
            (&[4, 5], &[6, 7, 9]),
            (&[6], &[8]),
            (&[1], &[0]),
        ]);
        for k in 1..=4 {
            let chosen = SetSelector::new(r.clone(), false).select(k).unwrap();
            assert!(chosen.len() <= k, "k={k} chose {chosen:?}");
        }
        assert_eq!(SetSelector::new(r, false).select(2).unwrap(), key(&[4, 5]));
    }

    #[test]
    fn test_stops_when_nothing_fits() {
        let r = ranking(&[(&[1, 2, 3], &[0])]);
        let mut selector = SetSelector::new(r, false);
        assert!(selector.select(2).unwrap().is_empty());
        assert_eq!(selector.log().iterations, 1);
    }

    #[test]
    fn test_weights_change_the_choice() {
        let r = ranking(&[(&[1], &[0]), (&[2], &[1])]);
        assert_eq!(SetSelector::new(r.clone(), false).select(1).unwrap(), key(&[1]));

        let mut weighted = SetSelector::new(r.clone(), true);
        weighted.set_sample_to_node_index(vec![10, 20]);
        weighted.set_sampled_node_weights(HashMap::from([(10, 0.1), (20, 0.9)]));
        assert_eq!(weighted.select(1).unwrap(), key(&[2]));
        assert!(weighted.log().weighted);

        let mut direct = SetSelector::new(r, true).with_sample_weights(vec![0.7, 0.2]);
        assert_eq!(direct.select(1).unwrap(), key(&[1]));
    }

    #[test]
    fn test_weighted_without_weights_is_an_error() {
        let r = ranking(&[(&[1], &[0])]);
        assert!(matches!(
            SetSelector::new(r, true).select(1),
            Err(BlockadeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_estimators() {
        let r = ranking(&[(&[1], &[0, 1]), (&[2], &[2]), (&[1, 2], &[3])]);
        let mut selector = SetSelector::new(r, false);
        selector.set_sample_to_node_index(vec![10, 10, 20, 20]);
        selector.set_sampled_node_weights(HashMap::from([(10, 0.5), (20, 1.0)]));

        let blocked = key(&[1]);
        assert_eq!(selector.positive_samples(&blocked), BTreeSet::from([0, 1]));
        assert_eq!(selector.positive_node_counts(&blocked).unwrap(), BTreeMap::from([(10, 2)]));
        assert_eq!(selector.predicted_normalized(3, &blocked), 0.5);
        // node 10: 2/2 * 0.5
        assert_eq!(selector.predicted_normalized_per_node(&blocked).unwrap(), 0.5);

        let both = key(&[1, 2]);
        assert_eq!(selector.positive_samples(&both).len(), 4);
        // 0.5 + 2/2 * 1.0
        assert_eq!(selector.predicted_normalized_per_node(&both).unwrap(), 1.5);
    }
}
