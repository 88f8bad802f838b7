//! Agent loop entities

use crate::tool::entities::ToolCall;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// Phase of one agent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    /// Waiting for the reasoning engine to produce a generation
    AwaitingGeneration,
    /// Executing the tool calls of the last generation
    DispatchingTools,
    /// The engine answered without tool calls
    Final,
    /// The round budget was exhausted before a final answer
    Incomplete,
}

impl AgentPhase {
    pub fn as_str(&self) -> &str {
        match self {
            AgentPhase::AwaitingGeneration => "awaiting_generation",
            AgentPhase::DispatchingTools => "dispatching_tools",
            AgentPhase::Final => "final",
            AgentPhase::Incomplete => "incomplete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentPhase::Final | AgentPhase::Incomplete)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: AgentPhase) -> bool {
        matches!(
            (self, next),
            (AgentPhase::AwaitingGeneration, AgentPhase::DispatchingTools)
                | (AgentPhase::AwaitingGeneration, AgentPhase::Final)
                | (AgentPhase::DispatchingTools, AgentPhase::AwaitingGeneration)
                | (AgentPhase::DispatchingTools, AgentPhase::Incomplete)
        )
    }
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an agent run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOutcome {
    Final,
    Incomplete,
}

impl AgentOutcome {
    pub fn phase(&self) -> AgentPhase {
        match self {
            AgentOutcome::Final => AgentPhase::Final,
            AgentOutcome::Incomplete => AgentPhase::Incomplete,
        }
    }
}

/// One dispatch round: the calls a generation requested and their results,
/// index-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub round: usize,
    pub calls: Vec<ToolCall>,
    pub results: Vec<ToolResult>,
}

impl AgentStep {
    pub fn new(round: usize, calls: Vec<ToolCall>, results: Vec<ToolResult>) -> Self {
        Self {
            round,
            calls,
            results,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Record of every dispatch round in one run.
///
/// Tool turns never reach the returned transcript; this trace is where they
/// can be inspected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTrace {
    pub steps: Vec<AgentStep>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: AgentStep) {
        self.steps.push(step);
    }

    pub fn rounds(&self) -> usize {
        self.steps.len()
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.steps.iter().flat_map(|s| s.calls.iter())
    }
}
