//! 输出时间网格
//!
//! 仿真时钟是连续的实数时间；调用方只在 `OutputGrid` 指定的时间点取样。

use serde::Serialize;

use crate::error::SimError;

/// 两个时间点相差不超过该值视为同一时刻。
pub const TIME_EPSILON: f64 = 1e-12;

/// 严格递增、非负、有限的输出时间序列。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputGrid {
    times: Vec<f64>,
}

impl OutputGrid {
    pub fn new(times: Vec<f64>) -> Result<Self, SimError> {
        if times.is_empty() {
            return Err(SimError::InvalidArgument(
                "output grid must contain at least one timepoint".into(),
            ));
        }
        if times.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(SimError::InvalidArgument(
                "output grid timepoints must be finite and non-negative".into(),
            ));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimError::InvalidArgument(
                "output grid timepoints must be strictly increasing".into(),
            ));
        }
        Ok(Self { times })
    }

    /// `points` 个等距时间点，首尾分别为 `start` 与 `end`。
    pub fn linspace(start: f64, end: f64, points: usize) -> Result<Self, SimError> {
        match points {
            0 => Err(SimError::InvalidArgument(
                "output grid must contain at least one timepoint".into(),
            )),
            1 => Self::new(vec![start]),
            _ => {
                if end <= start {
                    return Err(SimError::InvalidArgument(format!(
                        "grid end {end} must be greater than start {start}"
                    )));
                }
                let step = (end - start) / (points - 1) as f64;
                let mut times: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
                // 避免累积舍入让最后一个点偏离 end
                times[points - 1] = end;
                Self::new(times)
            }
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 仿真终点（最后一个输出时间点）
    pub fn horizon(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}
