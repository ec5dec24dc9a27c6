use anyhow::{bail, Context};
use blockade_core::{Graph, NodeId, Problem, SolveLog, Solver};
use blockade_sim::{CandidateReport, SimConfig, Simulator};
use blockade_solvers::{AnySolver, SolverKind, SolverParams};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

pub mod cli;
pub use cli::*;

/// Run manifest for complete reproducibility
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub algorithm: SolverKind,
    pub k: usize,
    pub seed: u64,
    pub iterations: usize, // simulation realizations
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(algorithm: SolverKind, k: usize, seed: u64, iterations: usize, graph: &Graph) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            algorithm,
            k,
            seed,
            iterations,
            graph_nodes: graph.num_nodes(),
            graph_edges: graph.num_edges(),
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }
}

/// Everything one `blockade run` produces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub manifest: RunManifest,
    pub solve: SolveLog,
    pub simulation: CandidateReport,
    pub total_time_secs: f64,
}

impl RunReport {
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading report {}", path.display()))?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

/// Load a graph from `{"nodes": [...], "edges": [{"u":..,"v":..,"w":..}]}`.
pub fn load_graph(path: impl AsRef<Path>) -> anyhow::Result<Graph> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph {}", path.display()))?;
    let graph = serde_json::from_str(&json)
        .with_context(|| format!("parsing graph {}", path.display()))?;
    Ok(graph)
}

pub fn save_graph(graph: &Graph, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(graph)?;
    std::fs::write(path, json).with_context(|| format!("writing graph to {}", path.display()))?;
    Ok(())
}

/// Whitespace-separated node ids. Integral floats such as `3.0` are accepted.
pub fn parse_seeds(text: &str) -> anyhow::Result<Vec<NodeId>> {
    text.split_whitespace()
        .map(|token| {
            if let Ok(id) = token.parse::<NodeId>() {
                return Ok(id);
            }
            match token.parse::<f64>() {
                Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= NodeId::MAX as f64 => Ok(v as NodeId),
                _ => bail!("invalid seed id {token:?}"),
            }
        })
        .collect()
}

pub fn load_seeds(path: impl AsRef<Path>) -> anyhow::Result<Vec<NodeId>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading seeds {}", path.display()))?;
    parse_seeds(&text).with_context(|| format!("parsing seeds {}", path.display()))
}

pub fn save_seeds(seeds: &[NodeId], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
    std::fs::write(path, text.join("\n") + "\n")
        .with_context(|| format!("writing seeds to {}", path.display()))?;
    Ok(())
}

/// Solve one instance with `kind`, then score the result by simulation.
pub fn solve_and_simulate(
    graph: Graph,
    seeds: Vec<NodeId>,
    k: usize,
    kind: SolverKind,
    params: &SolverParams,
    sim: &SimConfig,
) -> anyhow::Result<RunReport> {
    let start = Instant::now();
    let manifest = RunManifest::new(kind, k, params.seed, sim.iterations, &graph);

    let problem = Problem::new(graph.clone(), seeds.clone(), k).context("invalid problem")?;
    let mut solver = AnySolver::new(kind, problem, params)?;
    let blocked = solver.run().with_context(|| format!("{kind} solver failed"))?;
    info!(solver = %kind, k, nodes = graph.num_nodes(), "blocking set computed");

    let mut simulator = Simulator::new(&graph, seeds);
    simulator.add_blocked(kind.as_str(), blocked);
    let mut report = simulator.run(sim)?;
    let simulation = report.candidates.remove(kind.as_str()).unwrap_or_default();

    Ok(RunReport {
        manifest,
        solve: solver.log().clone(),
        simulation,
        total_time_secs: start.elapsed().as_secs_f64(),
    })
}

/// Get git commit hash for reproducibility
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
