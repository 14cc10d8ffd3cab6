//! 恢复模型
//!
//! 储备 → 活性酶 的激活级联驱动损伤修复：
//! - activation：Reserve → ActiveEnzyme
//! - regeneration：Damaged + ActiveEnzyme → Healthy + ActiveEnzyme + Stress
//! - dissipation：ActiveEnzyme → ∅

use crate::error::{SimError, ValidationError};
use crate::model::{NetworkBuilder, Overrides, ReactionDef, ReactionNetwork};
use crate::sim::OutputGrid;

pub const RESERVE: &str = "Reserve";
pub const ACTIVE_ENZYME: &str = "ActiveEnzyme";
pub const DAMAGED: &str = "Damaged";
pub const HEALTHY: &str = "Healthy";
pub const STRESS: &str = "Stress";

pub const K_ACTIVATION: &str = "k_activation";
pub const K_HEALING: &str = "k_healing";
pub const K_STRESS: &str = "k_stress";
pub const K_DECAY: &str = "k_decay";

/// 默认初始种群（按列顺序）
pub const DEFAULT_SPECIES: [(&str, i64); 5] = [
    (RESERVE, 1000),
    (ACTIVE_ENZYME, 0),
    (DAMAGED, 500),
    (HEALTHY, 500),
    (STRESS, 0),
];

/// 默认参数。`k_stress` 只声明，没有反应使用它。
pub const DEFAULT_PARAMETERS: [(&str, f64); 4] = [
    (K_ACTIVATION, 0.5),
    (K_HEALING, 2.0),
    (K_STRESS, 0.1),
    (K_DECAY, 0.3),
];

/// 终态损伤数低于该值视为完全恢复
pub const RECOVERY_THRESHOLD: u64 = 10;

pub const DEFAULT_HORIZON: f64 = 50.0;
pub const DEFAULT_POINTS: usize = 101;

/// 默认参数下的恢复网络
pub fn recovery_network() -> Result<ReactionNetwork, ValidationError> {
    let mut builder = NetworkBuilder::new();
    for (name, initial) in DEFAULT_SPECIES {
        builder = builder.species(name, initial);
    }
    for (name, value) in DEFAULT_PARAMETERS {
        builder = builder.parameter(name, value);
    }
    builder
        .reaction(
            ReactionDef::new("activation", K_ACTIVATION)
                .reactant(RESERVE, 1)
                .product(ACTIVE_ENZYME, 1),
        )
        .reaction(
            ReactionDef::new("regeneration", K_HEALING)
                .reactant(DAMAGED, 1)
                .reactant(ACTIVE_ENZYME, 1)
                .product(HEALTHY, 1)
                .product(ACTIVE_ENZYME, 1)
                .product(STRESS, 1),
        )
        .reaction(ReactionDef::new("dissipation", K_DECAY).reactant(ACTIVE_ENZYME, 1))
        .build()
}

/// 带覆盖的恢复网络
pub fn recovery_network_with(overrides: &Overrides) -> Result<ReactionNetwork, ValidationError> {
    recovery_network()?.with_overrides(overrides)
}

/// 默认输出网格：[0, 50] 上 101 个等距点
pub fn default_grid() -> Result<OutputGrid, SimError> {
    OutputGrid::linspace(0.0, DEFAULT_HORIZON, DEFAULT_POINTS)
}
