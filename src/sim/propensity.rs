//! 倾向函数计算
//!
//! 质量作用动力学：a_j = k_j · Π C(x_i, ν_ij)。每一步都根据当前种群重新计算，不跨步缓存。

use crate::model::{Reaction, ReactionNetwork};

/// 计算各反应的倾向（单位时间期望触发次数）。
#[derive(Debug, Clone)]
pub struct PropensityEvaluator<'a> {
    network: &'a ReactionNetwork,
    rates: Vec<f64>,
}

impl<'a> PropensityEvaluator<'a> {
    pub fn new(network: &'a ReactionNetwork) -> Self {
        Self {
            network,
            rates: network.rates(),
        }
    }

    pub fn network(&self) -> &'a ReactionNetwork {
        self.network
    }

    /// 把每个反应的倾向写入 `out`，返回总倾向 a0。
    pub fn evaluate(&self, populations: &[u64], out: &mut [f64]) -> f64 {
        debug_assert_eq!(out.len(), self.rates.len());
        let mut total = 0.0;
        for ((dst, reaction), &rate) in out
            .iter_mut()
            .zip(self.network.reactions())
            .zip(&self.rates)
        {
            let value = mass_action(reaction, rate, populations);
            *dst = value;
            total += value;
        }
        total
    }

    /// 便捷版本：分配新向量
    pub fn propensities(&self, populations: &[u64]) -> Vec<f64> {
        let mut out = vec![0.0; self.rates.len()];
        self.evaluate(populations, &mut out);
        out
    }
}

#[inline]
fn mass_action(reaction: &Reaction, rate: f64, populations: &[u64]) -> f64 {
    let mut propensity = rate;
    for term in reaction.reactants() {
        let available = populations[term.species.0];
        if available < u64::from(term.count) {
            return 0.0;
        }
        propensity *= binomial(available, term.count);
    }
    propensity
}

/// C(n, k) = n·(n−1)…(n−k+1) / k!，n < k 时为 0。
#[inline]
pub fn binomial(n: u64, k: u32) -> f64 {
    match k {
        0 => 1.0,
        1 => n as f64,
        2 if n >= 2 => (n as f64) * ((n - 1) as f64) / 2.0,
        _ if n < u64::from(k) => 0.0,
        _ => {
            let mut acc = 1.0;
            for i in 0..u64::from(k) {
                acc *= (n - i) as f64 / (i + 1) as f64;
            }
            acc
        }
    }
}
