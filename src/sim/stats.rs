//! 运行统计
//!
//! 单条轨迹的步进计数。

use serde::{Deserialize, Serialize};

use super::stepper::{StepOutcome, StepReport};

/// 运行统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: u64,
    pub leaps: u64,
    pub exact_events: u64,
    pub rejected_leaps: u64,
    /// leap 连续被拒绝、重试次数用尽后退回精确步的次数
    pub exhausted_retries: u64,
    /// 所有反应的总触发次数
    pub firings: u64,
}

impl RunStats {
    pub fn record(&mut self, report: &StepReport) {
        self.steps += 1;
        self.rejected_leaps += u64::from(report.rejected_leaps);
        if report.exhausted_retries {
            self.exhausted_retries += 1;
        }
        match report.outcome {
            StepOutcome::LeapApplied { firings, .. } => {
                self.leaps += 1;
                self.firings = self.firings.saturating_add(firings);
            }
            StepOutcome::ExactEventApplied { .. } => {
                self.exact_events += 1;
                self.firings = self.firings.saturating_add(1);
            }
            StepOutcome::LeapRejectedRetry { .. } | StepOutcome::Quiescent { .. } => {}
        }
    }
}
