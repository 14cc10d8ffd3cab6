//! 轨迹
//!
//! 输出网格上的 (时间, 种群快照) 序列，运行结束后不可变，由调用方持有。

use serde::{Deserialize, Serialize};

use super::stats::RunStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// 被 `CancelToken` 中途停止，只包含已到达的时间点
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    species: Vec<String>,
    times: Vec<f64>,
    states: Vec<Vec<u64>>,
    stats: RunStats,
    status: RunStatus,
}

impl Trajectory {
    pub(crate) fn new(
        species: Vec<String>,
        times: Vec<f64>,
        states: Vec<Vec<u64>>,
        stats: RunStats,
        status: RunStatus,
    ) -> Self {
        debug_assert_eq!(times.len(), states.len());
        Self {
            species,
            times,
            states,
            stats,
            status,
        }
    }

    /// 列顺序
    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[Vec<u64>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    /// 某个物种在所有输出点上的取值
    pub fn series(&self, name: &str) -> Option<Vec<u64>> {
        let idx = self.species_index(name)?;
        Some(self.states.iter().map(|s| s[idx]).collect())
    }

    pub fn value(&self, name: &str, point: usize) -> Option<u64> {
        let idx = self.species_index(name)?;
        self.states.get(point).map(|s| s[idx])
    }

    pub fn final_state(&self) -> Option<&[u64]> {
        self.states.last().map(Vec::as_slice)
    }

    pub fn final_value(&self, name: &str) -> Option<u64> {
        let idx = self.species_index(name)?;
        self.final_state().map(|s| s[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &[u64])> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.states.iter().map(Vec::as_slice))
    }
}

/// 集合中各物种终态的均值；空集合返回空向量。
pub fn mean_final_state(trajectories: &[Trajectory]) -> Vec<f64> {
    let mut sums: Vec<f64> = Vec::new();
    let mut n = 0usize;
    for t in trajectories {
        let Some(last) = t.final_state() else {
            continue;
        };
        if sums.is_empty() {
            sums = vec![0.0; last.len()];
        }
        for (acc, &v) in sums.iter_mut().zip(last) {
            *acc += v as f64;
        }
        n += 1;
    }
    if n > 0 {
        for acc in &mut sums {
            *acc /= n as f64;
        }
    }
    sums
}
