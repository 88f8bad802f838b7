//! Execution parameters for the agent loop.
//!
//! [`ExecutionParams`] groups the static parameters that bound the loop in
//! [`RunAgentUseCase`](crate::use_cases::run_agent::RunAgentUseCase).

use serde::{Deserialize, Serialize};

/// Agent loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum number of tool dispatch rounds in one run.
    pub max_tool_rounds: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_rounds: 15,
        }
    }
}

impl ExecutionParams {
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }
}
