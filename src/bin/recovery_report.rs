//! 恢复模型报告
//!
//! 运行恢复模型（可覆盖参数与初始种群），打印治疗报告；多条轨迹时附带集合统计。

use std::process::ExitCode;

use clap::Parser;
use tauleap_rs::SimError;
use tauleap_rs::model::Overrides;
use tauleap_rs::recovery::{
    DEFAULT_HORIZON, DEFAULT_POINTS, EnsembleReport, RecoverySummary, recovery_network,
};
use tauleap_rs::sim::{EnsembleOptions, OutputGrid, SimulationRunner, TauLeapConfig};
use tracing::warn;

#[derive(Debug, Parser)]
#[command(
    name = "recovery-report",
    about = "恢复模型仿真：打印治疗报告（最终健康/损伤/压力计数）"
)]
struct Args {
    /// 覆盖速率参数，格式 name=value，可重复
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,

    /// 覆盖初始种群，格式 species=count，可重复
    #[arg(long = "initial", value_parser = parse_initial)]
    initials: Vec<(String, i64)>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// 仿真终点
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    horizon: f64,

    /// 输出网格点数（含 0 与终点）
    #[arg(long, default_value_t = DEFAULT_POINTS)]
    points: usize,

    /// 集合大小；大于 1 时并行运行并打印集合统计
    #[arg(long, default_value_t = 1)]
    trajectories: usize,

    /// rayon 线程数；不指定时使用全局线程池
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    epsilon: Option<f64>,

    #[arg(long)]
    critical_threshold: Option<u64>,

    /// 打印每个输出时间点的种群
    #[arg(long)]
    timeline: bool,
}

fn parse_param(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = split_assignment(raw)?;
    let value = value
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name, value))
}

fn parse_initial(raw: &str) -> Result<(String, i64), String> {
    let (name, value) = split_assignment(raw)?;
    let value = value
        .parse::<i64>()
        .map_err(|e| format!("invalid count for '{name}': {e}"))?;
    Ok((name, value))
}

fn split_assignment(raw: &str) -> Result<(String, &str), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
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

fn run(args: &Args) -> Result<(), SimError> {
    let mut overrides = Overrides::new();
    for (name, value) in &args.params {
        overrides = overrides.parameter(name.clone(), *value);
    }
    for (name, count) in &args.initials {
        overrides = overrides.initial(name.clone(), *count);
    }

    let mut config = TauLeapConfig::default();
    if let Some(eps) = args.epsilon {
        config.epsilon = eps;
    }
    if let Some(nc) = args.critical_threshold {
        config.critical_threshold = nc;
    }

    let runner = SimulationRunner::new(recovery_network()?)
        .with_config(config)
        .with_overrides(&overrides)?;
    let grid = OutputGrid::linspace(0.0, args.horizon, args.points)?;

    if args.trajectories == 1 {
        let trajectory = runner.run_seeded(&grid, args.seed)?;
        if args.timeline {
            println!("time\t{}", trajectory.species().join("\t"));
            for (t, state) in trajectory.iter() {
                let cols: Vec<String> = state.iter().map(u64::to_string).collect();
                println!("{t:.2}\t{}", cols.join("\t"));
            }
        }
        let stats = trajectory.stats();
        println!(
            "steps={} leaps={} exact_events={} rejected_leaps={}",
            stats.steps, stats.leaps, stats.exact_events, stats.rejected_leaps
        );
        println!("{}", RecoverySummary::from_trajectory(&trajectory)?);
        return Ok(());
    }

    let options = EnsembleOptions {
        n_trajectories: args.trajectories,
        seed: Some(args.seed),
        n_threads: args.threads,
    };
    let mut summaries = Vec::with_capacity(args.trajectories);
    for (idx, result) in runner.run_ensemble(&grid, &options)?.into_iter().enumerate() {
        match result {
            Ok(trajectory) => summaries.push(RecoverySummary::from_trajectory(&trajectory)?),
            Err(e) => warn!(trajectory = idx, error = %e, "trajectory failed"),
        }
    }
    if summaries.is_empty() {
        return Err(SimError::InvalidArgument(
            "every trajectory in the ensemble failed".into(),
        ));
    }
    println!("{}", summaries[0]);
    println!();
    println!("{}", EnsembleReport::from_summaries(&summaries));
    Ok(())
}
