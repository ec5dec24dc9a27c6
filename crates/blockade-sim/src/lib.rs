//! Possible-world Monte-Carlo evaluation of blocking sets.
//!
//! Every realization samples one independent cascade from the seeds on the
//! unblocked graph, then scores all registered candidates against that same
//! outcome, so candidates are compared on identical randomness.

pub mod stats;
pub mod world;

pub use stats::Stats;
pub use world::PossibleWorld;

use blockade_core::{BlockadeError, Graph, NodeId, Result, RngStream};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Simulation settings.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub iterations: usize, // Number of independent realizations (J)
    pub seed: u64,         // Global seed; realization j uses stream (seed, j)
    pub use_parallel: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 42,
            use_parallel: true,
        }
    }
}

impl SimConfig {
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self {
            iterations,
            seed,
            ..Self::default()
        }
    }

    pub fn sequential(mut self) -> Self {
        self.use_parallel = false;
        self
    }
}

/// Aggregated scores of one named blocking set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub activated_nodes: Stats,
    pub saved_nodes: Stats,
    pub fraction_saved: Stats,
}

/// Aggregated outcome of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub iterations: usize,
    pub rounds_until_termination: Stats,
    pub active_nodes: Stats,
    /// Mean cumulative active count per round, padded with each
    /// realization's final count.
    pub mean_active_series: Vec<f64>,
    pub candidates: BTreeMap<String, CandidateReport>,
    pub elapsed_secs: f64,
}

/// Per-candidate numbers from a single realization.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CandidateOutcome {
    activated: usize,
    saved: usize,
    fraction_saved: f64,
}

/// Everything measured in a single realization.
#[derive(Clone, Debug)]
struct WorldOutcome {
    rounds: usize,
    active: usize,
    active_series: Vec<usize>,
    candidates: Vec<CandidateOutcome>,
}

/// Scores named blocking sets against shared cascade realizations.
pub struct Simulator<'g> {
    graph: &'g Graph,
    seeds: Vec<NodeId>,
    blocked: BTreeMap<String, Vec<NodeId>>,
}

impl<'g> Simulator<'g> {
    pub fn new(graph: &'g Graph, seeds: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            graph,
            seeds: seeds.into_iter().collect(),
            blocked: BTreeMap::new(),
        }
    }

    /// Register (or replace) a candidate blocking set under `name`.
    pub fn add_blocked(&mut self, name: impl Into<String>, nodes: impl IntoIterator<Item = NodeId>) {
        self.blocked.insert(name.into(), nodes.into_iter().collect());
    }

    /// Run `config.iterations` realizations and aggregate them.
    ///
    /// Seeds and blocked nodes are validated before anything is sampled.
    pub fn run(&self, config: &SimConfig) -> Result<SimulationReport> {
        let start = Instant::now();
        let (seed_idx, masks) = self.resolve()?;
        if config.iterations == 0 {
            return Err(BlockadeError::InvalidParameter {
                name: "iterations",
                reason: "at least one realization is required".to_string(),
            });
        }

        let realize = |j: usize| {
            let mut rng = RngStream::from_stream_id(config.seed, j as u64);
            self.score_world(&seed_idx, &masks, &mut rng)
        };
        let outcomes: Vec<WorldOutcome> = if config.use_parallel {
            (0..config.iterations).into_par_iter().map(realize).collect()
        } else {
            (0..config.iterations).map(realize).collect()
        };

        let mut report = self.merge(&outcomes);
        report.elapsed_secs = start.elapsed().as_secs_f64();

        info!(
            iterations = report.iterations,
            candidates = report.candidates.len(),
            active_mean = report.active_nodes.mean,
            elapsed_secs = report.elapsed_secs,
            "simulation finished"
        );
        for (name, c) in &report.candidates {
            debug!(
                candidate = %name,
                saved_mean = c.saved_nodes.mean,
                saved_var = c.saved_nodes.var,
                activated_mean = c.activated_nodes.mean,
                "candidate scored"
            );
        }

        Ok(report)
    }

    /// Sample one realization and score every candidate against it.
    ///
    /// `seeds` and `masks` must come from [`Simulator::resolve`].
    fn score_world(&self, seeds: &[usize], masks: &[Vec<bool>], rng: &mut RngStream) -> WorldOutcome {
        let world = PossibleWorld::sample(self.graph, seeds, rng);
        let active = world.active_count();

        let candidates = masks
            .iter()
            .map(|mask| {
                let activated = world.reachable_without(seeds, mask);
                let saved = active - activated;
                // seeds are always active, so `active` is never 0 for a valid run
                let fraction_saved = if active == 0 {
                    0.0
                } else {
                    saved as f64 / active as f64
                };
                CandidateOutcome {
                    activated,
                    saved,
                    fraction_saved,
                }
            })
            .collect();

        WorldOutcome {
            rounds: world.rounds,
            active,
            active_series: world.active_series,
            candidates,
        }
    }

    /// Map seeds and candidate sets onto node indices, failing on any id the
    /// graph does not contain.
    fn resolve(&self) -> Result<(Vec<usize>, Vec<Vec<bool>>)> {
        let seed_idx = self
            .seeds
            .iter()
            .map(|&s| self.graph.index_of(s).ok_or(BlockadeError::UnknownSeed(s)))
            .collect::<Result<Vec<_>>>()?;

        let mut masks = Vec::with_capacity(self.blocked.len());
        for (name, nodes) in &self.blocked {
            let mut mask = vec![false; self.graph.num_nodes()];
            for &n in nodes {
                let idx = self.graph.index_of(n).ok_or_else(|| BlockadeError::UnknownBlocked {
                    candidate: name.clone(),
                    node: n,
                })?;
                mask[idx] = true;
            }
            masks.push(mask);
        }

        Ok((seed_idx, masks))
    }

    fn merge(&self, outcomes: &[WorldOutcome]) -> SimulationReport {
        let samples = |f: &dyn Fn(&WorldOutcome) -> f64| -> Vec<f64> { outcomes.iter().map(f).collect() };

        let candidates = self
            .blocked
            .keys()
            .enumerate()
            .map(|(c, name)| {
                let report = CandidateReport {
                    activated_nodes: Stats::from_samples(&samples(&|o| o.candidates[c].activated as f64)),
                    saved_nodes: Stats::from_samples(&samples(&|o| o.candidates[c].saved as f64)),
                    fraction_saved: Stats::from_samples(&samples(&|o| o.candidates[c].fraction_saved)),
                };
                (name.clone(), report)
            })
            .collect();

        SimulationReport {
            iterations: outcomes.len(),
            rounds_until_termination: Stats::from_samples(&samples(&|o| o.rounds as f64)),
            active_nodes: Stats::from_samples(&samples(&|o| o.active as f64)),
            mean_active_series: mean_series(outcomes),
            candidates,
            elapsed_secs: 0.0,
        }
    }
}

fn mean_series(outcomes: &[WorldOutcome]) -> Vec<f64> {
    let len = outcomes.iter().map(|o| o.active_series.len()).max().unwrap_or(0);
    if outcomes.is_empty() {
        return Vec::new();
    }
    (0..len)
        .map(|r| {
            let total: usize = outcomes
                .iter()
                .map(|o| {
                    o.active_series
                        .get(r)
                        .or_else(|| o.active_series.last())
                        .copied()
                        .unwrap_or(0)
                })
                .sum();
            total as f64 / outcomes.len() as f64
        })
        .collect()
}
