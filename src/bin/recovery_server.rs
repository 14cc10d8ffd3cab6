//! 恢复模型 HTTP 服务
//!
//! `POST /api/simulate` 运行一条恢复轨迹，`GET /api/health` 健康检查。

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tauleap_rs::http::{ServiceConfig, serve};
use tauleap_rs::recovery::{DEFAULT_HORIZON, DEFAULT_POINTS};
use tauleap_rs::sim::{OutputGrid, TauLeapConfig};

#[derive(Debug, Parser)]
#[command(name = "recovery-server", about = "恢复模型 HTTP 服务")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:5000")]
    addr: SocketAddr,

    /// 固定种子（便于复现）；不指定时每个请求使用新的随机种子
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    horizon: f64,

    #[arg(long, default_value_t = DEFAULT_POINTS)]
    points: usize,

    #[arg(long)]
    epsilon: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
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
    let grid = match OutputGrid::linspace(0.0, args.horizon, args.points) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut tau_leap = TauLeapConfig::default();
    if let Some(eps) = args.epsilon {
        tau_leap.epsilon = eps;
    }
    if let Err(e) = tau_leap.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let config = ServiceConfig {
        grid,
        tau_leap,
        seed: args.seed,
    };
    match serve(args.addr, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: server failed on {}: {e}", args.addr);
            ExitCode::FAILURE
        }
    }
}
