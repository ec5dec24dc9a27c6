use crate::error::Result;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Blocked node ids in the order the solver ranked them.
pub type BlockedSet = Vec<NodeId>;

/// Structured record of one solver invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveLog {
    pub solver: String,
    pub total_time_secs: f64,
    pub blocked_nodes: BlockedSet,
    /// Set when the solver short-circuited instead of optimizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trivial: Option<String>,
    /// Solver-specific scalars (iteration counts, eigenvalues, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
}

impl SolveLog {
    pub fn new(solver: &str) -> Self {
        Self {
            solver: solver.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }
}

/// Common contract of every blocking strategy.
///
/// A solver owns its [`crate::Problem`] (and therefore a private copy of the
/// graph), so `run` needs no further inputs.
pub trait Solver {
    fn name(&self) -> &'static str;

    /// Compute the blocking set and fill in the log.
    fn run(&mut self) -> Result<BlockedSet>;

    fn log(&self) -> &SolveLog;
}
