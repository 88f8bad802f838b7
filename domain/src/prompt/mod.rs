//! Prompt domain
//!
//! System prompt installed on every agent session.

pub mod agent;

pub use agent::AgentPromptTemplate;
