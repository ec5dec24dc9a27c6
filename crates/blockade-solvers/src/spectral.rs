//! Spectral blocking: projected subgradient descent on the leading
//! eigenvalue of the partially blocked, symmetrized adjacency matrix.
//!
//! Node `i` carries a soft block level `x_i` in [0, 1] that attenuates all of
//! its outgoing edges. Each iteration takes a subgradient step along `-u uᵀ`
//! (u = leading eigenvector) with step `R / sqrt(t)` and projects back onto
//! `{0 <= x <= 1, sum x <= k}`. The running sum of iterates is ranked to get
//! the discrete blocking set.

use crate::eigen::leading_eigenpair;
use crate::projection::{project_onto_budget, row_norms};
use blockade_core::{BlockadeError, BlockedSet, Problem, Result, SolveLog, Solver};
use nalgebra::{DMatrix, DVector};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for the spectral optimizer
#[derive(Clone, Debug)]
pub struct SpectralConfig {
    pub epsilon: f64,                  // Target accuracy; T = ceil((R / epsilon)^2)
    pub max_iterations: Option<usize>, // Optional hard cap on T
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            max_iterations: None,
        }
    }
}

impl SpectralConfig {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = Some(cap);
        self
    }
}

/// Matrices and iterates of one relaxation run.
struct Relaxation {
    f: DMatrix<f64>,
    delta: DMatrix<f64>,
    delta_prime: DVector<f64>,
    r: f64,
    k: f64,
    x: DVector<f64>,
    x_star: DVector<f64>,
}

impl Relaxation {
    fn new(problem: &Problem) -> Self {
        let graph = problem.graph();
        let f = graph.adjacency_matrix();

        // seeds may never absorb blocking weight
        let mut delta = -&f;
        for &s in problem.seeds() {
            if let Some(i) = graph.index_of(s) {
                delta.row_mut(i).fill(0.0);
            }
        }

        let k = problem.k() as f64;
        let r = k.sqrt() * delta.amax();
        let delta_prime = row_norms(&delta);
        let n = graph.num_nodes();

        Self {
            f,
            delta,
            delta_prime,
            r,
            k,
            x: DVector::zeros(n),
            x_star: DVector::zeros(n),
        }
    }

    fn iteration_bound(&self, epsilon: f64) -> usize {
        (self.r / epsilon).powi(2).ceil() as usize
    }

    /// `F + diag(x) * Delta`, i.e. row i attenuated by its block level.
    fn blocked_matrix(&self) -> DMatrix<f64> {
        let mut m = self.f.clone();
        for (i, &xi) in self.x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            for j in 0..m.ncols() {
                m[(i, j)] += xi * self.delta[(i, j)];
            }
        }
        m
    }

    /// One projected subgradient step; returns the leading eigenvalue seen.
    fn step(&mut self, t: usize) -> Result<f64> {
        let m = self.blocked_matrix();
        let m2 = (&m + m.transpose()) * 0.5;
        let pair = leading_eigenpair(m2)?;
        let u = &pair.vector;
        let step = self.r / (t as f64).sqrt();

        // Row i of Y = x_i * Delta_i - step * u_i * uᵀ, so
        // Y_i · Delta_i = x_i |Delta_i|^2 - step * u_i * (Delta_i · u).
        let delta_u = &self.delta * u;
        let y_prime = DVector::from_iterator(
            self.x.len(),
            (0..self.x.len()).map(|i| {
                let dp = self.delta_prime[i];
                if dp > 0.0 {
                    (self.x[i] * dp * dp - step * u[i] * delta_u[i]) / dp
                } else {
                    0.0
                }
            }),
        );

        self.x = project_onto_budget(&self.delta_prime, &y_prime, self.k);
        self.x_star += &self.x;
        Ok(pair.value)
    }
}

/// Blocks the `k` nodes the spectral relaxation ranks highest.
pub struct SpectralSolver {
    problem: Problem,
    config: SpectralConfig,
    log: SolveLog,
    x_star: DVector<f64>,
    iterations: usize,
}

impl SpectralSolver {
    pub const NAME: &'static str = "spectral";

    pub fn new(problem: Problem, config: SpectralConfig) -> Result<Self> {
        if !(config.epsilon.is_finite() && config.epsilon > 0.0) {
            return Err(BlockadeError::InvalidParameter {
                name: "epsilon",
                reason: format!("{} must be a positive number", config.epsilon),
            });
        }
        let n = problem.graph().num_nodes();
        Ok(Self {
            problem,
            config,
            log: SolveLog::new(Self::NAME),
            x_star: DVector::zeros(n),
            iterations: 0,
        })
    }

    /// Accumulated iterates of the last run, indexed in graph node order.
    pub fn x_star(&self) -> &DVector<f64> {
        &self.x_star
    }

    /// Iterations performed by the last run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn calculate_x_star(&mut self) -> Result<()> {
        let mut relax = Relaxation::new(&self.problem);
        let bound = relax.iteration_bound(self.config.epsilon);
        let total = match self.config.max_iterations {
            Some(cap) if cap < bound => {
                warn!(bound, cap, "iteration bound truncated by max_iterations");
                cap
            }
            _ => bound,
        };
        self.log.record("R", relax.r);
        self.log.record("T", bound as f64);

        let checkpoint = (total / 10).max(1);
        for t in 1..=total {
            let eigenvalue = relax.step(t)?;
            if t == 1 {
                self.log.record("unblocked_eigenvalue", eigenvalue);
            }
            if t == total {
                self.log.record("final_eigenvalue", eigenvalue);
            }
            if t % checkpoint == 0 {
                debug!(t, total, eigenvalue, "spectral iteration");
            }
        }

        self.iterations = total;
        self.log.record("iterations", total as f64);
        self.x_star = relax.x_star;
        Ok(())
    }

    /// Top-k non-seed nodes by `x_star`, ties resolved by node order.
    fn ranked_blocked(&self) -> BlockedSet {
        let graph = self.problem.graph();
        let mut order: Vec<usize> = (0..graph.num_nodes()).collect();
        order.sort_by(|&a, &b| self.x_star[b].total_cmp(&self.x_star[a]).then(a.cmp(&b)));
        order
            .into_iter()
            .map(|i| graph.node_at(i))
            .filter(|n| !self.problem.is_seed(*n))
            .take(self.problem.k())
            .collect()
    }
}

impl Solver for SpectralSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self) -> Result<BlockedSet> {
        let start = Instant::now();
        self.log = SolveLog::new(Self::NAME);

        let blocked = if self.problem.seeds_can_spread() {
            self.calculate_x_star()?;
            self.ranked_blocked()
        } else {
            warn!("no edges leave the seeds, returning an arbitrary blocking set");
            self.log.trivial = Some("Trivial problem: no paths from seeds".to_string());
            self.problem
                .candidates()
                .into_iter()
                .take(self.problem.k())
                .collect()
        };

        self.log.total_time_secs = start.elapsed().as_secs_f64();
        self.log.blocked_nodes = blocked.clone();
        info!(
            solver = Self::NAME,
            iterations = self.iterations,
            elapsed_secs = self.log.total_time_secs,
            blocked = ?blocked,
            "solve finished"
        );
        Ok(blocked)
    }

    fn log(&self) -> &SolveLog {
        &self.log
    }
}
