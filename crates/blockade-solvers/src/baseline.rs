//! Reference strategies the spectral solver is compared against.

use blockade_core::{BlockedSet, Problem, Result, RngStream, SolveLog, Solver};
use std::time::Instant;
use tracing::info;

/// Blocks the `k` non-seed nodes with the highest total degree.
pub struct DegreeSolver {
    problem: Problem,
    log: SolveLog,
}

impl DegreeSolver {
    pub const NAME: &'static str = "degree";

    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            log: SolveLog::new(Self::NAME),
        }
    }
}

impl Solver for DegreeSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self) -> Result<BlockedSet> {
        let start = Instant::now();
        let graph = self.problem.graph();

        let mut degrees: Vec<(usize, usize)> = self
            .problem
            .candidates()
            .into_iter()
            .map(|n| (n, graph.degree(n)))
            .collect();
        // stable ascending sort, then take from the back: ties go to the
        // later node in graph order
        degrees.sort_by_key(|&(_, d)| d);
        let blocked: BlockedSet = degrees
            .iter()
            .rev()
            .take(self.problem.k())
            .map(|&(n, _)| n)
            .collect();

        self.log = SolveLog::new(Self::NAME);
        self.log.total_time_secs = start.elapsed().as_secs_f64();
        self.log.blocked_nodes = blocked.clone();
        info!(solver = Self::NAME, blocked = ?blocked, "solve finished");
        Ok(blocked)
    }

    fn log(&self) -> &SolveLog {
        &self.log
    }
}

/// Blocks `k` non-seed nodes drawn uniformly without replacement.
pub struct RandomSolver {
    problem: Problem,
    rng: RngStream,
    log: SolveLog,
}

impl RandomSolver {
    pub const NAME: &'static str = "random";

    pub fn new(problem: Problem, seed: u64) -> Self {
        Self {
            problem,
            rng: RngStream::new(seed),
            log: SolveLog::new(Self::NAME),
        }
    }
}

impl Solver for RandomSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self) -> Result<BlockedSet> {
        let start = Instant::now();
        let candidates = self.problem.candidates();
        let blocked = self.rng.sample_distinct(&candidates, self.problem.k());

        self.log = SolveLog::new(Self::NAME);
        self.log.total_time_secs = start.elapsed().as_secs_f64();
        self.log.blocked_nodes = blocked.clone();
        info!(solver = Self::NAME, blocked = ?blocked, "solve finished");
        Ok(blocked)
    }

    fn log(&self) -> &SolveLog {
        &self.log
    }
}
