//! 精确单事件步（SSA 回退）
//!
//! 当种群很小或 leap 不够精确时，按经典直接法只触发一个反应：
//! 事件间隔 ~ Exp(a0)，反应 j 以概率 a_j / a0 被选中。

use rand::Rng;
use rand_distr::Exp1;

use crate::model::ReactionId;

/// 精确法抽出的下一个事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactEvent {
    pub tau: f64,
    pub reaction: ReactionId,
}

/// 以 `rate` 为参数抽取指数分布的等待时间；`rate` 为 0 时返回 +∞。
pub fn exponential_wait<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> f64 {
    if rate <= 0.0 {
        return f64::INFINITY;
    }
    let e: f64 = rng.sample(Exp1);
    e / rate
}

/// 在 `include` 选中的反应中，按倾向加权选出一个。
///
/// `target` 应落在 `[0, Σ a_j)`；累计和严格大于 `target` 的第一个反应胜出，
/// 因此倾向为 0 的反应永远不会被选中。浮点舍入导致越界时退回最后一个倾向为正的反应。
pub fn select_reaction(
    propensities: &[f64],
    include: impl Fn(usize) -> bool,
    target: f64,
) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (j, &a) in propensities.iter().enumerate() {
        if a <= 0.0 || !include(j) {
            continue;
        }
        cumulative += a;
        last_positive = Some(j);
        if cumulative > target {
            return Some(j);
        }
    }
    last_positive
}

/// 抽取下一个精确事件；总倾向为 0 时没有事件可发生。
pub fn draw_exact_event<R: Rng + ?Sized>(
    propensities: &[f64],
    total: f64,
    rng: &mut R,
) -> Option<ExactEvent> {
    if total <= 0.0 {
        return None;
    }
    let tau = exponential_wait(total, rng);
    let u: f64 = rng.r#gen();
    let j = select_reaction(propensities, |_| true, u * total)?;
    Some(ExactEvent {
        tau,
        reaction: ReactionId(j),
    })
}
