//! LLM Gateway port
//!
//! Defines the interface for communicating with the reasoning engine.

use async_trait::async_trait;
use kowalski_domain::{LlmResponse, ToolDefinition, Turn};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Result of one tool call, sent back to the model.
///
/// `tool_use_id` pairs the result with the `ToolUse` block that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultMessage {
    pub tool_use_id: String,
    pub tool_name: String,
    pub output: serde_json::Value,
    pub is_error: bool,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with the
/// reasoning engine. Implementations (adapters) live in the infrastructure
/// layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identifier, for logging
    fn model_name(&self) -> &str;

    /// Create a session seeded with a system prompt and prior turns.
    ///
    /// `history` excludes the turn that will be sent first.
    async fn create_session(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active LLM session
///
/// The session owns the working context of one agent run: every message and
/// tool result sent through it is remembered for the next generation.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Send a user message and offer the given tools.
    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError>;

    /// Return tool results (in call order) and get the next generation.
    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError>;
}
