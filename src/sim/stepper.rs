//! 仿真步进器
//!
//! 每一步：重新计算倾向 → 选择 τ → 按泊松分布抽取各非关键反应的触发次数 →
//! 同时应用全部触发。出现负种群时整步作废，τ 折半重试；重试次数用尽后退回精确单事件步。
//! 种群向量只在这里被修改。

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use super::config::TauLeapConfig;
use super::exact::{draw_exact_event, exponential_wait, select_reaction};
use super::leap::{LeapSelection, LeapTimeSelector};
use super::propensity::PropensityEvaluator;
use super::state::SimulationState;
use super::time::TIME_EPSILON;
use crate::error::SimError;
use crate::model::{ReactionId, ReactionNetwork};
use tracing::{debug, trace};

/// 单步结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// 一次 tau-leap 被接受；`critical` 为本步触发的那一个关键反应
    LeapApplied {
        tau: f64,
        firings: u64,
        critical: Option<ReactionId>,
    },
    /// 精确法触发了一个反应
    ExactEventApplied { tau: f64, reaction: ReactionId },
    /// leap 会产生负种群，已作废（状态未改变）
    LeapRejectedRetry { tau: f64 },
    /// 没有反应发生，时钟直接推进到终点
    Quiescent { tau: f64 },
}

/// `step` 的汇总：最终结果 + 本步被拒绝的 leap 次数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    pub rejected_leaps: u32,
    /// 因重试次数用尽而退回精确步
    pub exhausted_retries: bool,
}

impl StepReport {
    fn accepted(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            rejected_leaps: 0,
            exhausted_retries: false,
        }
    }
}

/// 一次 leap 的计划：步长，以及在步内发生的关键反应（至多一个）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapPlan {
    pub tau: f64,
    pub critical: Option<ReactionId>,
}

pub struct SimulationStepper<'a> {
    evaluator: PropensityEvaluator<'a>,
    selector: LeapTimeSelector<'a>,
    config: TauLeapConfig,
    propensities: Vec<f64>,
    candidate: Vec<i64>,
}

impl<'a> SimulationStepper<'a> {
    pub fn new(network: &'a ReactionNetwork, config: TauLeapConfig) -> Self {
        Self {
            evaluator: PropensityEvaluator::new(network),
            selector: LeapTimeSelector::new(network, config),
            config,
            propensities: vec![0.0; network.n_reactions()],
            candidate: vec![0; network.n_species()],
        }
    }

    fn network(&self) -> &'a ReactionNetwork {
        self.evaluator.network()
    }

    /// 最近一次计算得到的倾向
    pub fn propensities(&self) -> &[f64] {
        &self.propensities
    }

    /// 根据当前种群重新计算倾向，并检查数值合法性。返回 a0。
    pub fn refresh_propensities(&mut self, state: &SimulationState) -> Result<f64, SimError> {
        let total = self
            .evaluator
            .evaluate(state.populations(), &mut self.propensities);
        for (j, &a) in self.propensities.iter().enumerate() {
            if !a.is_finite() || a < 0.0 {
                return Err(SimError::NumericInstability {
                    reaction: self.network().reactions()[j].name().to_string(),
                    quantity: "propensity",
                    value: a,
                });
            }
        }
        Ok(total)
    }

    /// 推进一步，但不会越过 `horizon`。
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        state: &mut SimulationState,
        horizon: f64,
        rng: &mut R,
    ) -> Result<StepReport, SimError> {
        let remaining = horizon - state.time();
        if remaining <= TIME_EPSILON {
            state.advance_to(horizon);
            return Ok(StepReport::accepted(StepOutcome::Quiescent { tau: 0.0 }));
        }

        let total = self.refresh_propensities(state)?;
        if total <= 0.0 {
            trace!(time = state.time(), "总倾向为 0，直接推进到终点");
            state.advance_to(horizon);
            return Ok(StepReport::accepted(StepOutcome::Quiescent { tau: remaining }));
        }

        let selection = self.selector.select(state.populations(), &self.propensities);
        let mut tau_critical = exponential_wait(selection.critical_total, rng);
        let chosen = selection.tau_noncritical.min(tau_critical);
        if chosen < self.config.exact_fallback_multiple / total {
            trace!(chosen, total, "leap 步长过小，改用精确步");
            let outcome = self.exact_step(state, horizon, total, rng)?;
            return Ok(StepReport::accepted(outcome));
        }

        let mut tau_noncritical = selection.tau_noncritical;
        let mut rejected = 0u32;
        loop {
            let plan = self.plan_leap(&selection, tau_noncritical, tau_critical, remaining, rng);
            match self.apply_leap(state, &plan, rng)? {
                StepOutcome::LeapRejectedRetry { tau } => {
                    rejected += 1;
                    debug!(time = state.time(), tau, rejected, "leap 产生负种群，折半重试");
                    if rejected > self.config.max_leap_rejections {
                        debug!(rejected, "重试次数用尽，退回精确步");
                        let outcome = self.exact_step(state, horizon, total, rng)?;
                        return Ok(StepReport {
                            outcome,
                            rejected_leaps: rejected,
                            exhausted_retries: true,
                        });
                    }
                    tau_noncritical = tau / 2.0;
                    tau_critical = exponential_wait(selection.critical_total, rng);
                }
                outcome => {
                    return Ok(StepReport {
                        outcome,
                        rejected_leaps: rejected,
                        exhausted_retries: false,
                    });
                }
            }
        }
    }

    /// 由候选步长确定本次 leap：τ = min(τ', τ'', 剩余时间)，
    /// 只有关键事件落在步内时才选出一个关键反应。
    fn plan_leap<R: Rng + ?Sized>(
        &self,
        selection: &LeapSelection,
        tau_noncritical: f64,
        tau_critical: f64,
        remaining: f64,
        rng: &mut R,
    ) -> LeapPlan {
        let tau = tau_noncritical.min(tau_critical).min(remaining);
        let critical = if tau_critical <= tau_noncritical && tau_critical <= remaining {
            let u: f64 = rng.r#gen();
            let flags = self.selector.critical();
            select_reaction(
                &self.propensities,
                |j| flags[j],
                u * selection.critical_total,
            )
            .map(ReactionId)
        } else {
            None
        };
        LeapPlan { tau, critical }
    }

    /// 按计划执行一次 leap。使用最近一次 `refresh_propensities` 的倾向。
    ///
    /// 非关键反应触发 Poisson(a_j·τ) 次，计划中的关键反应触发 1 次，其余关键反应不触发。
    /// 任一物种会变为负数时返回 `LeapRejectedRetry`，状态保持不变。
    pub fn apply_leap<R: Rng + ?Sized>(
        &mut self,
        state: &mut SimulationState,
        plan: &LeapPlan,
        rng: &mut R,
    ) -> Result<StepOutcome, SimError> {
        let network = self.network();
        for (dst, &x) in self.candidate.iter_mut().zip(state.populations()) {
            *dst = x as i64;
        }

        let critical_flags = self.selector.critical();
        let mut firings = 0u64;
        for (j, reaction) in network.reactions().iter().enumerate() {
            let a = self.propensities[j];
            let k = if critical_flags[j] {
                u64::from(plan.critical == Some(ReactionId(j)))
            } else if a > 0.0 {
                let mean = a * plan.tau;
                if !mean.is_finite() || mean < 0.0 {
                    return Err(SimError::NumericInstability {
                        reaction: reaction.name().to_string(),
                        quantity: "poisson mean",
                        value: mean,
                    });
                }
                sample_poisson(mean, rng).map_err(|_| SimError::NumericInstability {
                    reaction: reaction.name().to_string(),
                    quantity: "poisson mean",
                    value: mean,
                })?
            } else {
                0
            };
            if k == 0 {
                continue;
            }
            firings = firings.saturating_add(k);
            let k = i64::try_from(k).unwrap_or(i64::MAX);
            for &(species, delta) in reaction.changes() {
                let slot = &mut self.candidate[species.0];
                *slot = slot.saturating_add(k.saturating_mul(delta));
            }
        }

        if self.candidate.iter().any(|&v| v < 0) {
            return Ok(StepOutcome::LeapRejectedRetry { tau: plan.tau });
        }

        state.commit(&self.candidate, plan.tau);
        trace!(time = state.time(), tau = plan.tau, firings, "leap 已应用");
        Ok(StepOutcome::LeapApplied {
            tau: plan.tau,
            firings,
            critical: plan.critical,
        })
    }

    /// 精确单事件步；下一事件落在终点之后时只推进时钟。
    pub fn exact_step<R: Rng + ?Sized>(
        &mut self,
        state: &mut SimulationState,
        horizon: f64,
        total: f64,
        rng: &mut R,
    ) -> Result<StepOutcome, SimError> {
        let remaining = (horizon - state.time()).max(0.0);
        let Some(event) = draw_exact_event(&self.propensities, total, rng) else {
            state.advance_to(horizon);
            return Ok(StepOutcome::Quiescent { tau: remaining });
        };
        if event.tau > remaining {
            state.advance_to(horizon);
            return Ok(StepOutcome::Quiescent { tau: remaining });
        }

        let reaction = self.network().reaction(event.reaction);
        for (dst, &x) in self.candidate.iter_mut().zip(state.populations()) {
            *dst = x as i64;
        }
        for &(species, delta) in reaction.changes() {
            let slot = &mut self.candidate[species.0];
            *slot += delta;
            if *slot < 0 {
                // 倾向为正时反应物一定足够，走到这里说明倾向计算有误
                return Err(SimError::NumericInstability {
                    reaction: reaction.name().to_string(),
                    quantity: "population",
                    value: *slot as f64,
                });
            }
        }
        state.commit(&self.candidate, event.tau);
        trace!(time = state.time(), reaction = reaction.name(), "精确事件已应用");
        Ok(StepOutcome::ExactEventApplied {
            tau: event.tau,
            reaction: event.reaction,
        })
    }
}

fn sample_poisson<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> Result<u64, rand_distr::PoissonError> {
    if mean == 0.0 {
        return Ok(0);
    }
    let dist = Poisson::new(mean)?;
    let k: f64 = dist.sample(rng);
    Ok(k as u64)
}
