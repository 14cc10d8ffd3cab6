//! 恢复模型与报告
//!
//! 五物种、三反应的示例网络，以及「完全/部分恢复」的判定。

mod model;
mod report;

pub use model::{
    ACTIVE_ENZYME, DAMAGED, DEFAULT_HORIZON, DEFAULT_PARAMETERS, DEFAULT_POINTS, DEFAULT_SPECIES,
    HEALTHY, K_ACTIVATION, K_DECAY, K_HEALING, K_STRESS, RECOVERY_THRESHOLD, RESERVE, STRESS,
    default_grid, recovery_network, recovery_network_with,
};
pub use report::{EnsembleReport, RecoverySummary};
