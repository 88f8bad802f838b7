//! Domain layer for kowalski
//!
//! This crate contains the core types of the chat gateway: transcripts, tool
//! descriptors and results, login sessions, and the agent state machine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! An ordered list of user / ai / tool turns. The agent appends exactly one
//! `ai` turn per run.
//!
//! ## Tools
//!
//! Independent backend services advertise tools through the
//! [`ToolProvider`] trait; the agent sees their union as a [`ToolSpec`].

pub mod account;
pub mod agent;
pub mod chat;
pub mod core;
pub mod envelope;
pub mod prompt;
pub mod protocol;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use account::{User, UserView};
pub use agent::{AgentOutcome, AgentPhase, AgentStep, RunTrace};
pub use chat::{Role, Transcript, Turn};
pub use core::error::{DomainError, validate_username};
pub use envelope::{Envelope, Status};
pub use prompt::AgentPromptTemplate;
pub use session::{
    entities::Session,
    response::{ContentBlock, LlmResponse, StopReason},
};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    provider::{ProviderError, ToolProvider},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
