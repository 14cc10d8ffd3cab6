//! 反应网络模型模块
//!
//! 此模块包含反应网络的数据模型：物种、参数、反应，以及构建期校验和 JSON 描述。

// 子模块声明
mod id;
mod network;
mod network_spec;
mod overrides;
mod reaction;

// 重新导出公共接口
pub use id::{ParameterId, ReactionId, SpeciesId};
pub use network::{NetworkBuilder, ReactionDef, ReactionNetwork};
pub use network_spec::{
    GridSpec, NetworkMeta, NetworkSpec, ParameterSpec, ReactionSpec, SpeciesSpec, TermSpec,
};
pub use overrides::Overrides;
pub use reaction::{Parameter, Reaction, Species, StoichTerm};
