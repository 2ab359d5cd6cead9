use crate::error::{CompileError, ErrorKind, Result};
use serde::Deserialize;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Fold arithmetic and comparisons over literals instead of emitting nodes.
    #[serde(default = "default_true")]
    pub precompute: bool,
    /// Replace inline list literals with `assembly_list` nodes when finishing a graph.
    #[serde(default = "default_true")]
    pub expand_list_literals: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            precompute: true,
            expand_list_literals: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CompileError::new(ErrorKind::InvalidConfig(e.to_string())))
    }

    pub fn without_precompute(mut self) -> Self {
        self.precompute = false;
        self
    }
}
