use crate::{load_graph, load_seeds, save_graph, save_seeds, solve_and_simulate};
use anyhow::Context;
use blockade_core::generators::{self, Skeleton};
use blockade_core::RngStream;
use blockade_sim::SimConfig;
use blockade_solvers::{SolverKind, SolverParams};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "blockade")]
#[command(about = "Blockade - choose nodes to block against independent-cascade spread")]
#[command(long_about = "Spectral and baseline blocking solvers with possible-world simulation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve one instance and score the blocking set by simulation
    Run {
        /// Graph JSON file
        graph: PathBuf,

        /// Seeds file (whitespace-separated node ids)
        seeds: PathBuf,

        /// Number of nodes to block
        k: usize,

        /// Blocking algorithm
        #[arg(value_enum)]
        algorithm: AlgorithmType,

        /// Simulation realizations
        #[arg(short = 'j', long, default_value = "100")]
        iterations: usize,

        /// Output report (JSON)
        #[arg(short = 'o', long, default_value = "blockade.json")]
        out: PathBuf,

        /// Spectral accuracy target
        #[arg(long, default_value = "0.1")]
        epsilon: f64,

        /// Cap on spectral iterations
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Random seed (random solver and simulation)
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate a synthetic graph and a seeds file
    Generate {
        /// Graph family
        #[arg(long, value_enum)]
        kind: GraphKind,

        /// Size: nodes for path/binomial, leaves for star, side for grid
        #[arg(long)]
        n: usize,

        /// Edge probability (binomial only)
        #[arg(long, default_value = "0.1")]
        p: f64,

        /// Add both arcs for every undirected edge
        #[arg(long)]
        both_directions: bool,

        /// Edge weight, or its upper bound with --random-weight
        #[arg(long, default_value = "0.3")]
        weight_scale: f64,

        /// Draw weights as U(0,1) * weight_scale
        #[arg(long)]
        random_weight: bool,

        /// Number of seed nodes to draw
        #[arg(long, default_value = "1")]
        num_seeds: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output graph JSON
        #[arg(long)]
        out: PathBuf,

        /// Output seeds file (default: <out>.seeds)
        #[arg(long)]
        seeds_out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AlgorithmType {
    #[value(name = "degree")]
    Degree,
    #[value(name = "random")]
    Random,
    #[value(name = "spectral")]
    Spectral,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GraphKind {
    #[value(name = "path")]
    Path,
    #[value(name = "star")]
    Star,
    #[value(name = "grid")]
    Grid,
    #[value(name = "binomial")]
    Binomial,
}

impl From<AlgorithmType> for SolverKind {
    fn from(algorithm: AlgorithmType) -> Self {
        match algorithm {
            AlgorithmType::Degree => SolverKind::Degree,
            AlgorithmType::Random => SolverKind::Random,
            AlgorithmType::Spectral => SolverKind::Spectral,
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_run_command(
    graph: PathBuf,
    seeds: PathBuf,
    k: usize,
    algorithm: AlgorithmType,
    iterations: usize,
    out: PathBuf,
    epsilon: f64,
    max_iterations: Option<usize>,
    seed: u64,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let kind = SolverKind::from(algorithm);
    let g = load_graph(&graph)?;
    let seed_ids = load_seeds(&seeds)?;

    println!("Blockade Run");
    println!("============");
    println!("Graph: {:?} ({} nodes, {} edges)", graph, g.num_nodes(), g.num_edges());
    println!("Seeds: {:?}", seed_ids);
    println!("Algorithm: {}", kind);
    println!("k: {}", k);
    println!("Simulation iterations: {}", iterations);

    let params = SolverParams {
        epsilon,
        max_iterations,
        seed,
    };
    let sim = SimConfig::new(iterations, seed);
    let report = solve_and_simulate(g, seed_ids, k, kind, &params, &sim)?;

    println!("{} blocked {:?}", kind, report.solve.blocked_nodes);
    println!(
        "Solver time: {:.5}s; Objective (saved): {:.1}; Total time: {:.5}s",
        report.solve.total_time_secs,
        report.simulation.saved_nodes.mean,
        start.elapsed().as_secs_f64()
    );

    report.save_to_file(&out)?;
    println!("Report saved to {:?}", out);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_generate_command(
    kind: GraphKind,
    n: usize,
    p: f64,
    both_directions: bool,
    weight_scale: f64,
    random_weight: bool,
    num_seeds: usize,
    seed: u64,
    out: PathBuf,
    seeds_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut rng = RngStream::new(seed);
    let skeleton: Skeleton = match kind {
        GraphKind::Path => generators::path(n),
        GraphKind::Star => generators::star(n),
        GraphKind::Grid => generators::grid(n, n),
        GraphKind::Binomial => generators::binomial(n, p, &mut rng)?,
    };

    let mut graph = skeleton.orient(both_directions, &mut rng)?;
    generators::assign_weights(&mut graph, weight_scale, random_weight, &mut rng)?;
    let seeds = generators::random_seeds(&graph, num_seeds, &mut rng);
    if seeds.len() < num_seeds {
        anyhow::bail!("graph has {} nodes, cannot draw {} seeds", graph.num_nodes(), num_seeds);
    }

    let seeds_path = seeds_out.unwrap_or_else(|| out.with_extension("seeds"));
    save_graph(&graph, &out).context("saving generated graph")?;
    save_seeds(&seeds, &seeds_path)?;

    println!("Generated {:?}: {} nodes, {} edges", kind, graph.num_nodes(), graph.num_edges());
    println!("Wrote graph to {:?}", out);
    println!("Wrote {} seeds to {:?}", seeds.len(), seeds_path);
    Ok(())
}
