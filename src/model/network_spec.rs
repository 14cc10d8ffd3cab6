use serde::{Deserialize, Serialize};

use super::network::{NetworkBuilder, ReactionDef, ReactionNetwork};
use crate::error::{SimError, ValidationError};
use crate::sim::{OutputGrid, TauLeapConfig};

/// JSON form of a reaction network, e.g. the file consumed by the `simulate` binary.
///
/// Species, parameters and reactions are arrays rather than maps so that
/// declaration order is kept and duplicate names are reported instead of
/// silently merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub meta: Option<NetworkMeta>,
    pub species: Vec<SpeciesSpec>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub reactions: Vec<ReactionSpec>,
    #[serde(default)]
    pub config: Option<TauLeapConfig>,
    #[serde(default)]
    pub grid: Option<GridSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub name: String,
    #[serde(default)]
    pub initial: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSpec {
    pub name: String,
    #[serde(default)]
    pub reactants: Vec<TermSpec>,
    #[serde(default)]
    pub products: Vec<TermSpec>,
    /// Name of the rate parameter.
    pub rate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSpec {
    pub species: String,
    #[serde(default = "default_count")]
    pub count: i64,
}

fn default_count() -> i64 {
    1
}

/// Evenly spaced output grid: `points` samples on `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridSpec {
    #[serde(default)]
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl GridSpec {
    pub fn to_grid(&self) -> Result<OutputGrid, SimError> {
        OutputGrid::linspace(self.start, self.end, self.points)
    }
}

impl NetworkSpec {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_network(&self) -> Result<ReactionNetwork, ValidationError> {
        let mut builder = NetworkBuilder::new();
        for s in &self.species {
            builder = builder.species(s.name.clone(), s.initial);
        }
        for p in &self.parameters {
            builder = builder.parameter(p.name.clone(), p.value);
        }
        for r in &self.reactions {
            let mut def = ReactionDef::new(r.name.clone(), r.rate.clone());
            for t in &r.reactants {
                def = def.reactant(t.species.clone(), t.count);
            }
            for t in &r.products {
                def = def.product(t.species.clone(), t.count);
            }
            builder = builder.reaction(def);
        }
        builder.build()
    }
}
