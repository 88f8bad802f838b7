//! Type definitions for the RunAgent use case.

use crate::ports::llm_gateway::GatewayError;
use crate::ports::tool_executor::RegistryError;
use kowalski_domain::{AgentOutcome, DomainError, RunTrace, Transcript};
use thiserror::Error;

/// Errors that can occur during Agent execution
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(#[from] DomainError),

    #[error("Tool discovery failed: {0}")]
    Discovery(#[from] RegistryError),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunAgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunAgentError::Cancelled)
    }
}

/// Input for the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    /// Full transcript; must end with a user turn
    pub transcript: Transcript,
}

impl RunAgentInput {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }
}

/// Output from the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentOutput {
    /// Input transcript plus exactly one `ai` turn
    pub transcript: Transcript,
    /// How the run ended
    pub outcome: AgentOutcome,
    /// Every dispatch round, including the tool results kept out of the transcript
    pub trace: RunTrace,
}
