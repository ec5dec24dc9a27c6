use blockade_io::cli::{run_generate_command, run_run_command, Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            graph,
            seeds,
            k,
            algorithm,
            iterations,
            out,
            epsilon,
            max_iterations,
            seed,
        } => {
            run_run_command(graph, seeds, k, algorithm, iterations, out, epsilon, max_iterations, seed)?;
        }
        Commands::Generate {
            kind,
            n,
            p,
            both_directions,
            weight_scale,
            random_weight,
            num_seeds,
            seed,
            out,
            seeds_out,
        } => {
            run_generate_command(
                kind,
                n,
                p,
                both_directions,
                weight_scale,
                random_weight,
                num_seeds,
                seed,
                out,
                seeds_out,
            )?;
        }
    }

    Ok(())
}
