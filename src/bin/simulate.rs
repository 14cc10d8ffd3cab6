use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tauleap_rs::SimError;
use tauleap_rs::model::NetworkSpec;
use tauleap_rs::sim::{
    EnsembleOptions, OutputGrid, SimulationRunner, Trajectory, mean_final_state,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "simulate",
    about = "Run a reaction network described in JSON with the tau-leaping engine"
)]
struct Args {
    /// Path to network.json
    #[arg(long)]
    network: PathBuf,

    /// Write trajectories as a JSON array to this file
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of independent trajectories
    #[arg(long, default_value_t = 1)]
    trajectories: usize,

    /// Dedicated rayon pool size (defaults to the global pool)
    #[arg(long)]
    threads: Option<usize>,

    /// Override the grid end time from network.json
    #[arg(long)]
    horizon: Option<f64>,

    /// Override the number of grid points from network.json
    #[arg(long)]
    points: Option<usize>,

    /// Override epsilon from network.json
    #[arg(long)]
    epsilon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TrajectoryRecord<'a> {
    index: usize,
    seed: u64,
    #[serde(flatten)]
    trajectory: &'a Trajectory,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sim(#[from] SimError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let raw = fs::read_to_string(&args.network).map_err(|source| CliError::Read {
        path: args.network.clone(),
        source,
    })?;
    let spec = NetworkSpec::from_json(&raw)?;
    let network = spec.to_network().map_err(SimError::from)?;

    let mut config = spec.config.unwrap_or_default();
    if let Some(eps) = args.epsilon {
        config.epsilon = eps;
    }

    let (start, end, points) = match spec.grid {
        Some(g) => (g.start, g.end, g.points),
        None => (0.0, 10.0, 101),
    };
    let grid = OutputGrid::linspace(
        start,
        args.horizon.unwrap_or(end),
        args.points.unwrap_or(points),
    )?;

    if let Some(name) = spec.meta.as_ref().and_then(|m| m.name.as_deref()) {
        info!(network = name, "loaded network");
    }
    let runner = SimulationRunner::new(network).with_config(config);
    let options = EnsembleOptions {
        n_trajectories: args.trajectories,
        seed: Some(args.seed),
        n_threads: args.threads,
    };
    let results = runner.run_ensemble(&grid, &options)?;

    let species = runner.network().species_names();
    let mut completed = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Ok(trajectory) => {
                let last = trajectory.final_state().unwrap_or(&[]);
                let cols: Vec<String> = species
                    .iter()
                    .zip(last)
                    .map(|(name, v)| format!("{name}={v}"))
                    .collect();
                let stats = trajectory.stats();
                println!(
                    "trajectory {idx}: {} steps={} leaps={} exact_events={} rejected_leaps={}",
                    cols.join(" "),
                    stats.steps,
                    stats.leaps,
                    stats.exact_events,
                    stats.rejected_leaps
                );
                completed.push((idx, trajectory));
            }
            Err(e) => {
                warn!(trajectory = idx, error = %e, "trajectory failed");
                first_error.get_or_insert(e);
            }
        }
    }

    let (indices, finals): (Vec<usize>, Vec<Trajectory>) = completed.into_iter().unzip();
    if finals.len() > 1 {
        let means: Vec<String> = species
            .iter()
            .zip(mean_final_state(&finals))
            .map(|(name, m)| format!("{name}={m:.2}"))
            .collect();
        println!("mean final: {}", means.join(" "));
    }

    if let Some(path) = &args.out {
        let records: Vec<TrajectoryRecord<'_>> = indices
            .iter()
            .zip(&finals)
            .map(|(&idx, trajectory)| TrajectoryRecord {
                index: idx,
                seed: args.seed,
                trajectory,
            })
            .collect();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        eprintln!("wrote trajectories to {}", path.display());
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
