//! 轨迹记录器
//!
//! 把不规则的仿真时钟重采样到调用方请求的输出网格上：
//! 每个输出时间点取「该时刻或之前最近一次观测到的状态」。
//! 随机仿真的状态在两次事件之间不变，因此这种保持插值是精确的。

use super::time::{OutputGrid, TIME_EPSILON};

#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    times: Vec<f64>,
    next: usize,
    states: Vec<Vec<u64>>,
    last: Option<(f64, Vec<u64>)>,
}

impl TrajectoryRecorder {
    pub fn new(grid: &OutputGrid) -> Self {
        Self {
            times: grid.times().to_vec(),
            next: 0,
            states: Vec::with_capacity(grid.len()),
            last: None,
        }
    }

    /// 观测到新状态：`state` 从 `time` 起生效。观测必须按时间递增到达。
    pub fn observe(&mut self, time: f64, state: &[u64]) {
        if let Some((last_time, _)) = &self.last {
            debug_assert!(time + TIME_EPSILON >= *last_time, "observations must not go back in time");
        }
        // 严格早于 `time` 的输出点都由上一个状态覆盖
        while let Some(&tp) = self.times.get(self.next) {
            if tp + TIME_EPSILON >= time {
                break;
            }
            let held = match &self.last {
                Some((_, s)) => s.clone(),
                None => state.to_vec(),
            };
            self.states.push(held);
            self.next += 1;
        }
        match &mut self.last {
            Some((t, s)) => {
                *t = time;
                s.clear();
                s.extend_from_slice(state);
            }
            None => self.last = Some((time, state.to_vec())),
        }
    }

    /// 已经确定下来的输出点数
    pub fn recorded(&self) -> usize {
        self.states.len()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 运行结束：最后观测到的状态保持到所有剩余输出点。
    pub fn finish(mut self) -> (Vec<f64>, Vec<Vec<u64>>) {
        if let Some((_, s)) = self.last.take() {
            while self.states.len() < self.times.len() {
                self.states.push(s.clone());
            }
        }
        (self.times, self.states)
    }

    /// 运行被中途取消：只输出时钟已经到达的时间点。
    pub fn into_partial(mut self) -> (Vec<f64>, Vec<Vec<u64>>) {
        if let Some((last_time, s)) = self.last.take() {
            while let Some(&tp) = self.times.get(self.next) {
                if tp > last_time + TIME_EPSILON {
                    break;
                }
                self.states.push(s.clone());
                self.next += 1;
            }
        }
        self.times.truncate(self.states.len());
        (self.times, self.states)
    }
}
