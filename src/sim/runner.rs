//! 仿真运行器
//!
//! 从 t=0 驱动步进器直到最后一个输出时间点，把每个中间状态交给记录器。
//! 集合运行（多条独立轨迹）用 rayon 并行：每条轨迹独占初始种群副本和随机数流，
//! 运行期间没有共享可变状态。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use super::config::TauLeapConfig;
use super::recorder::TrajectoryRecorder;
use super::state::SimulationState;
use super::stats::RunStats;
use super::stepper::SimulationStepper;
use super::time::{OutputGrid, TIME_EPSILON};
use super::trajectory::{RunStatus, Trajectory};
use crate::error::{SimError, ValidationError};
use crate::model::{Overrides, ReactionNetwork};
use tracing::{debug, info};

/// 协作式取消标记：运行器在每两步之间检查一次。
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// 集合运行选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleOptions {
    pub n_trajectories: usize,
    /// 基础种子；`None` 时使用固定的默认种子
    pub seed: Option<u64>,
    /// 专用线程池大小；`None` 时使用 rayon 全局线程池
    pub n_threads: Option<usize>,
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self {
            n_trajectories: 1,
            seed: None,
            n_threads: None,
        }
    }
}

/// 由基础种子和轨迹编号导出该轨迹的种子（SplitMix64），与调度顺序无关。
pub fn derive_seed(seed: Option<u64>, trajectory: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E3779B97F4A7C15;
    let base = seed.unwrap_or(0xDEADBEEFCAFEBABE);
    let mut z = base ^ trajectory.wrapping_mul(GOLDEN_GAMMA);
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// 第 `trajectory` 条轨迹使用的随机数流
pub fn trajectory_rng(seed: Option<u64>, trajectory: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(seed, trajectory))
}

#[derive(Debug, Clone)]
pub struct SimulationRunner {
    network: ReactionNetwork,
    config: TauLeapConfig,
}

impl SimulationRunner {
    pub fn new(network: ReactionNetwork) -> Self {
        Self {
            network,
            config: TauLeapConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TauLeapConfig) -> Self {
        self.config = config;
        self
    }

    /// 应用参数/初始种群覆盖；覆盖不合法时返回校验错误。
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ValidationError> {
        if !overrides.is_empty() {
            self.network = self.network.with_overrides(overrides)?;
        }
        Ok(self)
    }

    pub fn network(&self) -> &ReactionNetwork {
        &self.network
    }

    pub fn config(&self) -> &TauLeapConfig {
        &self.config
    }

    pub fn run<R: Rng + ?Sized>(
        &self,
        grid: &OutputGrid,
        rng: &mut R,
    ) -> Result<Trajectory, SimError> {
        self.run_cancellable(grid, rng, &CancelToken::default())
    }

    /// 使用 `seed` 派生的随机数流运行一条轨迹；与集合运行中编号 0 的轨迹一致。
    pub fn run_seeded(&self, grid: &OutputGrid, seed: u64) -> Result<Trajectory, SimError> {
        let mut rng = trajectory_rng(Some(seed), 0);
        self.run(grid, &mut rng)
    }

    #[tracing::instrument(skip_all, fields(
        species = self.network.n_species(),
        reactions = self.network.n_reactions(),
        horizon = grid.horizon(),
    ))]
    pub fn run_cancellable<R: Rng + ?Sized>(
        &self,
        grid: &OutputGrid,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Trajectory, SimError> {
        self.config.validate()?;
        let horizon = grid.horizon();
        let mut state = SimulationState::new(self.network.initial_populations());
        let mut stepper = SimulationStepper::new(&self.network, self.config);
        let mut recorder = TrajectoryRecorder::new(grid);
        let mut stats = RunStats::default();

        debug!(points = grid.len(), "▶️  开始运行仿真");
        recorder.observe(state.time(), state.populations());

        while state.time() < horizon - TIME_EPSILON {
            if cancel.is_cancelled() {
                info!(time = state.time(), steps = stats.steps, "⏹️  运行被取消");
                let (times, states) = recorder.into_partial();
                return Ok(Trajectory::new(
                    self.network.species_names(),
                    times,
                    states,
                    stats,
                    RunStatus::Cancelled,
                ));
            }
            let report = stepper.step(&mut state, horizon, rng)?;
            stats.record(&report);
            recorder.observe(state.time(), state.populations());
        }

        debug!(
            steps = stats.steps,
            leaps = stats.leaps,
            exact_events = stats.exact_events,
            rejected_leaps = stats.rejected_leaps,
            "✅ 仿真完成"
        );
        let (times, states) = recorder.finish();
        Ok(Trajectory::new(
            self.network.species_names(),
            times,
            states,
            stats,
            RunStatus::Completed,
        ))
    }

    pub fn run_ensemble(
        &self,
        grid: &OutputGrid,
        options: &EnsembleOptions,
    ) -> Result<Vec<Result<Trajectory, SimError>>, SimError> {
        self.run_ensemble_cancellable(grid, options, &CancelToken::default())
    }

    /// 并行运行多条独立轨迹。每条轨迹的结果单独返回，一条失败不影响其余轨迹。
    pub fn run_ensemble_cancellable(
        &self,
        grid: &OutputGrid,
        options: &EnsembleOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<Result<Trajectory, SimError>>, SimError> {
        if options.n_trajectories == 0 {
            return Err(SimError::InvalidArgument(
                "number of trajectories must be greater than zero".into(),
            ));
        }
        info!(
            n_trajectories = options.n_trajectories,
            seed = ?options.seed,
            n_threads = ?options.n_threads,
            "▶️  开始集合运行"
        );

        let seed = options.seed;
        let simulate = || -> Vec<Result<Trajectory, SimError>> {
            (0..options.n_trajectories)
                .into_par_iter()
                .map(|idx| {
                    let mut rng = trajectory_rng(seed, idx as u64);
                    self.run_cancellable(grid, &mut rng, cancel)
                })
                .collect()
        };

        let results = match options.n_threads {
            Some(n) => ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| SimError::ThreadPool(e.to_string()))?
                .install(simulate),
            None => simulate(),
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            completed = results.len() - failed,
            failed,
            "✅ 集合运行完成"
        );
        Ok(results)
    }
}
