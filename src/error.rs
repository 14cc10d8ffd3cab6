//! 错误类型
//!
//! 网络定义校验错误与仿真运行期错误。

use thiserror::Error;

/// 反应网络定义错误：在构建阶段抛出，不在内部恢复。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },
    #[error("duplicate species '{0}'")]
    DuplicateSpecies(String),
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),
    #[error("duplicate reaction '{0}'")]
    DuplicateReaction(String),
    #[error("species '{species}' has negative initial population {value}")]
    NegativePopulation { species: String, value: i64 },
    #[error("reaction '{reaction}' references undeclared species '{species}'")]
    UnknownSpecies { reaction: String, species: String },
    #[error("reaction '{reaction}' references undeclared rate parameter '{parameter}'")]
    UnknownParameter { reaction: String, parameter: String },
    #[error(
        "reaction '{reaction}' has non-positive stoichiometric coefficient {coefficient} for species '{species}'"
    )]
    InvalidStoichiometry {
        reaction: String,
        species: String,
        coefficient: i64,
    },
    #[error("reaction '{reaction}' lists species '{species}' more than once on the same side")]
    RepeatedSpecies { reaction: String, species: String },
    #[error("override refers to undeclared species '{0}'")]
    UnknownSpeciesOverride(String),
    #[error("override refers to undeclared parameter '{0}'")]
    UnknownParameterOverride(String),
}

/// 仿真错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// 泊松均值或倾向函数为负数/非有限值，说明速率参数有问题。
    #[error("numeric instability in reaction '{reaction}': {quantity} = {value}")]
    NumericInstability {
        reaction: String,
        quantity: &'static str,
        value: f64,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
