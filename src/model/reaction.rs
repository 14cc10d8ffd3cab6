//! 反应、物种与参数
//!
//! 定义网络中的基本元素。反应保存化学计量项，并预先计算净状态变化向量。

use super::id::{ParameterId, SpeciesId};

/// 物种：名称 + 初始种群
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub initial: u64,
}

/// 参数：名称 + 数值（速率系数）
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
}

/// 化学计量项：某物种在反应一侧出现的份数（正整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoichTerm {
    pub species: SpeciesId,
    pub count: u32,
}

/// 质量作用反应
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub(crate) name: String,
    pub(crate) reactants: Vec<StoichTerm>,
    pub(crate) products: Vec<StoichTerm>,
    pub(crate) rate: ParameterId,
    /// 净变化（已合并同一物种的反应物/产物项，省略为 0 的项）
    pub(crate) changes: Vec<(SpeciesId, i64)>,
}

impl Reaction {
    pub(crate) fn new(
        name: String,
        reactants: Vec<StoichTerm>,
        products: Vec<StoichTerm>,
        rate: ParameterId,
    ) -> Self {
        let changes = net_changes(&reactants, &products);
        Self {
            name,
            reactants,
            products,
            rate,
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reactants(&self) -> &[StoichTerm] {
        &self.reactants
    }

    pub fn products(&self) -> &[StoichTerm] {
        &self.products
    }

    pub fn rate_parameter(&self) -> ParameterId {
        self.rate
    }

    /// 一次触发对种群向量造成的净变化
    pub fn changes(&self) -> &[(SpeciesId, i64)] {
        &self.changes
    }

    /// 反应级数（反应物份数之和）
    pub fn order(&self) -> u32 {
        self.reactants.iter().map(|t| t.count).sum()
    }

    /// 反应对某物种的需求份数；不是反应物时返回 0
    pub fn reactant_count(&self, species: SpeciesId) -> u32 {
        self.reactants
            .iter()
            .find(|t| t.species == species)
            .map_or(0, |t| t.count)
    }
}

fn net_changes(reactants: &[StoichTerm], products: &[StoichTerm]) -> Vec<(SpeciesId, i64)> {
    let mut changes: Vec<(SpeciesId, i64)> = Vec::new();
    let mut add = |species: SpeciesId, delta: i64| {
        match changes.iter_mut().find(|(s, _)| *s == species) {
            Some((_, d)) => *d += delta,
            None => changes.push((species, delta)),
        }
    };
    for t in reactants {
        add(t.species, -i64::from(t.count));
    }
    for t in products {
        add(t.species, i64::from(t.count));
    }
    changes.retain(|&(_, d)| d != 0);
    changes.sort_by_key(|&(s, _)| s);
    changes
}
