//! 仿真核心模块
//!
//! 此模块包含 tau-leaping 随机仿真引擎：倾向计算、leap 时间选择、精确步回退、
//! 步进、轨迹重采样与运行编排。

// 子模块声明
mod config;
mod exact;
mod leap;
mod propensity;
mod recorder;
mod runner;
mod state;
mod stats;
mod stepper;
mod time;
mod trajectory;

// 重新导出公共接口
pub use config::TauLeapConfig;
pub use exact::{ExactEvent, draw_exact_event, exponential_wait, select_reaction};
pub use leap::{LeapSelection, LeapTimeSelector, firings_until_depletion, highest_order_factor};
pub use propensity::{PropensityEvaluator, binomial};
pub use recorder::TrajectoryRecorder;
pub use runner::{
    CancelToken, EnsembleOptions, SimulationRunner, derive_seed, trajectory_rng,
};
pub use state::SimulationState;
pub use stats::RunStats;
pub use stepper::{LeapPlan, SimulationStepper, StepOutcome, StepReport};
pub use time::{OutputGrid, TIME_EPSILON};
pub use trajectory::{RunStatus, Trajectory, mean_final_state};
