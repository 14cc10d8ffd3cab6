//! Leap 时间选择
//!
//! 按 Cao–Gillespie–Petzold (2006) 的做法：
//! - 先把「再触发不到 n_c 次就可能耗尽某个反应物」的反应标记为关键反应
//! - 对非关键反应，约束每个反应物物种在 τ 内的期望变化与方差，得到候选步长 τ'
//! - 关键反应由调用方按指数分布单独抽取下一次发生时间

use super::config::TauLeapConfig;
use crate::model::{Reaction, ReactionNetwork};
use tracing::trace;

/// 一次选择的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapSelection {
    /// 非关键反应的候选步长 τ'；没有任何约束时为 +∞
    pub tau_noncritical: f64,
    /// 关键反应倾向之和 a0c
    pub critical_total: f64,
    pub n_critical: usize,
}

/// 反应在耗尽某个被净消耗的物种前还能触发的次数 L_j；
/// 反应不净消耗任何物种（纯生成、催化剂）时返回 `None`。
pub fn firings_until_depletion(reaction: &Reaction, populations: &[u64]) -> Option<u64> {
    reaction
        .changes()
        .iter()
        .filter(|&&(_, delta)| delta < 0)
        .map(|&(species, delta)| populations[species.0] / delta.unsigned_abs())
        .min()
}

/// 最高阶反应因子 g_i：把物种相对变化的约束换算到倾向的相对变化上。
pub fn highest_order_factor(order: u32, copies: u32, population: u64) -> f64 {
    let x = population as f64;
    let inv = |k: f64| 1.0 / (x - k).max(1.0);
    match (order, copies) {
        (0, _) | (1, _) => 1.0,
        (2, 2) => 2.0 + inv(1.0),
        (2, _) => 2.0,
        (3, 3) => 3.0 + inv(1.0) + 2.0 * inv(2.0),
        (3, 2) => 1.5 * (2.0 + inv(1.0)),
        (3, _) => 3.0,
        (n, _) => f64::from(n),
    }
}

#[derive(Debug, Clone)]
pub struct LeapTimeSelector<'a> {
    network: &'a ReactionNetwork,
    config: TauLeapConfig,
    rates: Vec<f64>,
    critical: Vec<bool>,
    mu: Vec<f64>,
    sigma2: Vec<f64>,
    // (最高反应阶数, 该阶反应中对该物种的最大需求份数)
    hor: Vec<(u32, u32)>,
    bounded: Vec<bool>,
}

impl<'a> LeapTimeSelector<'a> {
    pub fn new(network: &'a ReactionNetwork, config: TauLeapConfig) -> Self {
        let n_species = network.n_species();
        Self {
            network,
            config,
            rates: network.rates(),
            critical: vec![false; network.n_reactions()],
            mu: vec![0.0; n_species],
            sigma2: vec![0.0; n_species],
            hor: vec![(0, 0); n_species],
            bounded: vec![false; n_species],
        }
    }

    pub fn config(&self) -> &TauLeapConfig {
        &self.config
    }

    /// 最近一次 `select` 的关键反应标记（按反应顺序）
    pub fn critical(&self) -> &[bool] {
        &self.critical
    }

    pub fn is_critical(&self, reaction: &Reaction, populations: &[u64]) -> bool {
        firings_until_depletion(reaction, populations)
            .is_some_and(|left| left < self.config.critical_threshold)
    }

    pub fn select(&mut self, populations: &[u64], propensities: &[f64]) -> LeapSelection {
        let network = self.network;
        let reactions = network.reactions();
        self.mu.fill(0.0);
        self.sigma2.fill(0.0);
        self.hor.fill((0, 0));
        self.bounded.fill(false);

        let mut critical_total = 0.0;
        let mut n_critical = 0;
        for (j, reaction) in reactions.iter().enumerate() {
            self.critical[j] = false;
            // 速率系数为 0 的反应永远不会触发，不参与任何约束
            if self.rates[j] <= 0.0 {
                continue;
            }
            let order = reaction.order();
            for term in reaction.reactants() {
                let slot = &mut self.hor[term.species.0];
                if order > slot.0 {
                    *slot = (order, term.count);
                } else if order == slot.0 {
                    slot.1 = slot.1.max(term.count);
                }
            }
            let a = propensities[j];
            if a > 0.0 && self.is_critical(reaction, populations) {
                self.critical[j] = true;
                critical_total += a;
                n_critical += 1;
                continue;
            }
            // 倾向暂时为 0 的反应物种也要约束 τ：种群一旦增长，该反应就会开始消耗它
            for term in reaction.reactants() {
                self.bounded[term.species.0] = true;
            }
            if a <= 0.0 {
                continue;
            }
            for &(species, delta) in reaction.changes() {
                let v = delta as f64;
                self.mu[species.0] += v * a;
                self.sigma2[species.0] += v * v * a;
            }
        }

        let eps = self.config.epsilon;
        let mut tau_noncritical = f64::INFINITY;
        for i in 0..populations.len() {
            if !self.bounded[i] {
                continue;
            }
            let (order, copies) = self.hor[i];
            let g = highest_order_factor(order, copies, populations[i]);
            let bound = (eps * populations[i] as f64 / g).max(1.0);
            let mu = self.mu[i].abs();
            let sigma2 = self.sigma2[i];
            let by_mean = if mu > 0.0 { bound / mu } else { f64::INFINITY };
            let by_var = if sigma2 > 0.0 {
                bound * bound / sigma2
            } else {
                f64::INFINITY
            };
            tau_noncritical = tau_noncritical.min(by_mean).min(by_var);
        }

        trace!(tau_noncritical, critical_total, n_critical, "leap 时间选择");
        LeapSelection {
            tau_noncritical,
            critical_total,
            n_critical,
        }
    }
}
