//! 反应网络
//!
//! `ReactionNetwork` 是校验过的不可变网络定义：物种、参数与反应。
//! 只能通过 `NetworkBuilder`（或 `NetworkSpec`）构建，构建后只读。

use std::collections::HashMap;

use super::id::{ParameterId, ReactionId, SpeciesId};
use super::overrides::Overrides;
use super::reaction::{Parameter, Reaction, Species, StoichTerm};
use crate::error::ValidationError;
use tracing::debug;

/// 未经校验的反应声明，按名称引用物种与速率参数。
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionDef {
    pub name: String,
    pub reactants: Vec<(String, i64)>,
    pub products: Vec<(String, i64)>,
    pub rate: String,
}

impl ReactionDef {
    pub fn new(name: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reactants: Vec::new(),
            products: Vec::new(),
            rate: rate.into(),
        }
    }

    pub fn reactant(mut self, species: impl Into<String>, count: i64) -> Self {
        self.reactants.push((species.into(), count));
        self
    }

    pub fn product(mut self, species: impl Into<String>, count: i64) -> Self {
        self.products.push((species.into(), count));
        self
    }
}

/// 网络构建器：保留声明顺序，`build` 时统一校验。
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    species: Vec<(String, i64)>,
    parameters: Vec<(String, f64)>,
    reactions: Vec<ReactionDef>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(mut self, name: impl Into<String>, initial: i64) -> Self {
        self.species.push((name.into(), initial));
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    pub fn reaction(mut self, def: ReactionDef) -> Self {
        self.reactions.push(def);
        self
    }

    /// 校验并构建网络
    pub fn build(self) -> Result<ReactionNetwork, ValidationError> {
        let mut species = Vec::with_capacity(self.species.len());
        let mut species_index = HashMap::new();
        for (name, initial) in self.species {
            if name.is_empty() {
                return Err(ValidationError::EmptyName { kind: "species" });
            }
            if initial < 0 {
                return Err(ValidationError::NegativePopulation {
                    species: name,
                    value: initial,
                });
            }
            if species_index.contains_key(&name) {
                return Err(ValidationError::DuplicateSpecies(name));
            }
            species_index.insert(name.clone(), SpeciesId(species.len()));
            species.push(Species {
                name,
                initial: initial as u64,
            });
        }

        let mut parameters = Vec::with_capacity(self.parameters.len());
        let mut parameter_index = HashMap::new();
        for (name, value) in self.parameters {
            if name.is_empty() {
                return Err(ValidationError::EmptyName { kind: "parameter" });
            }
            if parameter_index.contains_key(&name) {
                return Err(ValidationError::DuplicateParameter(name));
            }
            parameter_index.insert(name.clone(), ParameterId(parameters.len()));
            parameters.push(Parameter { name, value });
        }

        let mut reactions = Vec::with_capacity(self.reactions.len());
        let mut reaction_index = HashMap::new();
        for def in self.reactions {
            if def.name.is_empty() {
                return Err(ValidationError::EmptyName { kind: "reaction" });
            }
            if reaction_index.contains_key(&def.name) {
                return Err(ValidationError::DuplicateReaction(def.name));
            }
            let rate = *parameter_index.get(&def.rate).ok_or_else(|| {
                ValidationError::UnknownParameter {
                    reaction: def.name.clone(),
                    parameter: def.rate.clone(),
                }
            })?;
            let reactants = resolve_terms(&def.name, &def.reactants, &species_index)?;
            let products = resolve_terms(&def.name, &def.products, &species_index)?;
            reaction_index.insert(def.name.clone(), ReactionId(reactions.len()));
            reactions.push(Reaction::new(def.name, reactants, products, rate));
        }

        debug!(
            species = species.len(),
            parameters = parameters.len(),
            reactions = reactions.len(),
            "反应网络校验通过"
        );

        Ok(ReactionNetwork {
            species,
            parameters,
            reactions,
            species_index,
            parameter_index,
            reaction_index,
        })
    }
}

fn resolve_terms(
    reaction: &str,
    terms: &[(String, i64)],
    species_index: &HashMap<String, SpeciesId>,
) -> Result<Vec<StoichTerm>, ValidationError> {
    let mut out: Vec<StoichTerm> = Vec::with_capacity(terms.len());
    for (name, count) in terms {
        let species = *species_index
            .get(name)
            .ok_or_else(|| ValidationError::UnknownSpecies {
                reaction: reaction.to_string(),
                species: name.clone(),
            })?;
        if *count <= 0 || *count > i64::from(u32::MAX) {
            return Err(ValidationError::InvalidStoichiometry {
                reaction: reaction.to_string(),
                species: name.clone(),
                coefficient: *count,
            });
        }
        if out.iter().any(|t| t.species == species) {
            return Err(ValidationError::RepeatedSpecies {
                reaction: reaction.to_string(),
                species: name.clone(),
            });
        }
        out.push(StoichTerm {
            species,
            count: *count as u32,
        });
    }
    Ok(out)
}

/// 校验过的反应网络
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionNetwork {
    species: Vec<Species>,
    parameters: Vec<Parameter>,
    reactions: Vec<Reaction>,
    species_index: HashMap<String, SpeciesId>,
    parameter_index: HashMap<String, ParameterId>,
    reaction_index: HashMap<String, ReactionId>,
}

impl ReactionNetwork {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.species_index.get(name).copied()
    }

    pub fn parameter_id(&self, name: &str) -> Option<ParameterId> {
        self.parameter_index.get(name).copied()
    }

    pub fn reaction_id(&self, name: &str) -> Option<ReactionId> {
        self.reaction_index.get(name).copied()
    }

    pub fn species_by_name(&self, name: &str) -> Option<&Species> {
        self.species_id(name).map(|id| &self.species[id.0])
    }

    pub fn parameter_by_name(&self, name: &str) -> Option<&Parameter> {
        self.parameter_id(name).map(|id| &self.parameters[id.0])
    }

    pub fn reaction_by_name(&self, name: &str) -> Option<&Reaction> {
        self.reaction_id(name).map(|id| &self.reactions[id.0])
    }

    pub fn reaction(&self, id: ReactionId) -> &Reaction {
        &self.reactions[id.0]
    }

    /// 物种名称（按列顺序）
    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }

    /// 初始种群向量快照
    pub fn initial_populations(&self) -> Vec<u64> {
        self.species.iter().map(|s| s.initial).collect()
    }

    /// 反应的速率系数
    pub fn rate(&self, id: ReactionId) -> f64 {
        self.parameters[self.reactions[id.0].rate.0].value
    }

    /// 所有反应的速率系数（按反应顺序）
    pub fn rates(&self) -> Vec<f64> {
        self.reactions
            .iter()
            .map(|r| self.parameters[r.rate.0].value)
            .collect()
    }

    /// 应用参数值与初始种群覆盖，返回新的网络；原网络不变。
    pub fn with_overrides(&self, overrides: &Overrides) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        for (name, &value) in &overrides.parameters {
            let id = self
                .parameter_id(name)
                .ok_or_else(|| ValidationError::UnknownParameterOverride(name.clone()))?;
            next.parameters[id.0].value = value;
        }
        for (name, &value) in &overrides.initial_states {
            let id = self
                .species_id(name)
                .ok_or_else(|| ValidationError::UnknownSpeciesOverride(name.clone()))?;
            if value < 0 {
                return Err(ValidationError::NegativePopulation {
                    species: name.clone(),
                    value,
                });
            }
            next.species[id.0].initial = value as u64;
        }
        Ok(next)
    }
}
