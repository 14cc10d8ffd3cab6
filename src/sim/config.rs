//! Tau-leaping 参数
//!
//! 引擎的可调参数，默认值取文献常用值（Cao, Gillespie & Petzold 2006）。

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TauLeapConfig {
    /// 精度参数 ε：一次 leap 内各物种期望相对变化的上界
    pub epsilon: f64,
    /// 关键反应阈值 n_c：再触发不到 n_c 次就可能耗尽某个反应物的反应视为关键反应
    pub critical_threshold: u64,
    /// 当 τ 小于 `exact_fallback_multiple / a0` 时改用精确单事件步
    pub exact_fallback_multiple: f64,
    /// 单步内 leap 被拒绝（出现负种群）后折半重试的最大次数
    pub max_leap_rejections: u32,
}

impl Default for TauLeapConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.03,
            critical_threshold: 10,
            exact_fallback_multiple: 10.0,
            max_leap_rejections: 8,
        }
    }
}

impl TauLeapConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(SimError::InvalidArgument(format!(
                "epsilon must be in (0, 1), got {}",
                self.epsilon
            )));
        }
        if !(self.exact_fallback_multiple.is_finite() && self.exact_fallback_multiple >= 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "exact_fallback_multiple must be a non-negative number, got {}",
                self.exact_fallback_multiple
            )));
        }
        Ok(())
    }
}
