//! 仿真状态
//!
//! (时钟, 种群向量)。每次运行独占一份，由初始种群复制而来。

/// 仿真状态
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    time: f64,
    populations: Vec<u64>,
}

impl SimulationState {
    pub fn new(populations: Vec<u64>) -> Self {
        Self {
            time: 0.0,
            populations,
        }
    }

    /// 当前仿真时间
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn populations(&self) -> &[u64] {
        &self.populations
    }

    /// 只推进时钟（不发生反应）
    pub(super) fn advance_to(&mut self, time: f64) {
        self.time = self.time.max(time);
    }

    /// 用已校验为非负的新种群替换当前种群，并推进时钟。
    ///
    /// 种群只在这里被修改，调用方只有 `SimulationStepper`。
    pub(super) fn commit(&mut self, populations: &[i64], dt: f64) {
        debug_assert_eq!(populations.len(), self.populations.len());
        for (dst, &v) in self.populations.iter_mut().zip(populations) {
            debug_assert!(v >= 0);
            *dst = v as u64;
        }
        self.time += dt;
    }
}
