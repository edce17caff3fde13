use super::binding::BindingStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    pub binding: BindingStrategy,
    /// Routines to analyze. Empty means every routine with a body.
    pub routines: Vec<String>,
}

impl AnalysisConfig {
    pub fn with_binding(mut self, binding: BindingStrategy) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_routine(mut self, name: impl Into<String>) -> Self {
        self.routines.push(name.into());
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
