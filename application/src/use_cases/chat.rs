//! Chat use case: the gateway's `/chat` behaviour.

use crate::use_cases::run_agent::{RunAgentError, RunAgentInput, RunAgentUseCase};
use kowalski_domain::{AgentOutcome, Transcript};
use tracing::debug;

/// Result of a chat request
#[derive(Debug, Clone)]
pub struct ChatOutput {
    pub transcript: Transcript,
    /// `None` when the transcript was echoed without running the agent
    pub outcome: Option<AgentOutcome>,
}

/// Hands user-terminated transcripts to the agent and echoes everything else.
#[derive(Clone)]
pub struct ChatUseCase {
    agent: RunAgentUseCase,
}

impl ChatUseCase {
    pub fn new(agent: RunAgentUseCase) -> Self {
        Self { agent }
    }

    pub async fn execute(&self, transcript: Transcript) -> Result<ChatOutput, RunAgentError> {
        if !transcript.ends_with_user_turn() {
            debug!(
                turns = transcript.len(),
                "Transcript does not end with a user turn, echoing"
            );
            return Ok(ChatOutput {
                transcript,
                outcome: None,
            });
        }

        let output = self.agent.execute(RunAgentInput::new(transcript)).await?;
        Ok(ChatOutput {
            transcript: output.transcript,
            outcome: Some(output.outcome),
        })
    }
}
