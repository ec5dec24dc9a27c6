use crate::baseline::{DegreeSolver, RandomSolver};
use crate::spectral::{SpectralConfig, SpectralSolver};
use blockade_core::{BlockedSet, Problem, Result, SolveLog, Solver};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every blocking strategy the crate ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Degree,
    Random,
    Spectral,
}

impl SolverKind {
    pub const ALL: [SolverKind; 3] = [SolverKind::Degree, SolverKind::Random, SolverKind::Spectral];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Degree => DegreeSolver::NAME,
            SolverKind::Random => RandomSolver::NAME,
            SolverKind::Spectral => SpectralSolver::NAME,
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs shared by all solvers; each one reads what it needs.
#[derive(Clone, Debug)]
pub struct SolverParams {
    pub epsilon: f64,
    pub max_iterations: Option<usize>,
    pub seed: u64,
}

impl Default for SolverParams {
    fn default() -> Self {
        let spectral = SpectralConfig::default();
        Self {
            epsilon: spectral.epsilon,
            max_iterations: spectral.max_iterations,
            seed: 42,
        }
    }
}

impl SolverParams {
    pub fn spectral_config(&self) -> SpectralConfig {
        SpectralConfig {
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
        }
    }
}

pub enum AnySolver {
    Degree(DegreeSolver),
    Random(RandomSolver),
    Spectral(SpectralSolver),
}

impl AnySolver {
    pub fn new(kind: SolverKind, problem: Problem, params: &SolverParams) -> Result<Self> {
        Ok(match kind {
            SolverKind::Degree => AnySolver::Degree(DegreeSolver::new(problem)),
            SolverKind::Random => AnySolver::Random(RandomSolver::new(problem, params.seed)),
            SolverKind::Spectral => {
                AnySolver::Spectral(SpectralSolver::new(problem, params.spectral_config())?)
            }
        })
    }

    pub fn kind(&self) -> SolverKind {
        match self {
            AnySolver::Degree(_) => SolverKind::Degree,
            AnySolver::Random(_) => SolverKind::Random,
            AnySolver::Spectral(_) => SolverKind::Spectral,
        }
    }

    fn inner(&self) -> &dyn Solver {
        match self {
            AnySolver::Degree(s) => s,
            AnySolver::Random(s) => s,
            AnySolver::Spectral(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Solver {
        match self {
            AnySolver::Degree(s) => s,
            AnySolver::Random(s) => s,
            AnySolver::Spectral(s) => s,
        }
    }
}

impl Solver for AnySolver {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn run(&mut self) -> Result<BlockedSet> {
        self.inner_mut().run()
    }

    fn log(&self) -> &SolveLog {
        self.inner().log()
    }
}
