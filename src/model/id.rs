//! 标识符类型
//!
//! 定义物种、参数和反应在网络中的下标。

/// 物种标识符（即种群向量中的列号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub usize);

/// 参数标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterId(pub usize);

/// 反应标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReactionId(pub usize);
