//! 运行期覆盖
//!
//! 对参数值和初始种群的覆盖（按名称）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub initial_states: BTreeMap<String, i64>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn initial(mut self, name: impl Into<String>, value: i64) -> Self {
        self.initial_states.insert(name.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.initial_states.is_empty()
    }
}
