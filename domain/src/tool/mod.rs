//! Tool domain module
//!
//! Defines how the agent reaches capabilities that live in independent
//! backend services (script sandbox, data service, search service).
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (invocation) │    │ (output)     │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`]: merged catalog of discovered tools
//! - [`ToolDefinition`]: name, description and JSON input schema
//! - [`ToolCall`]: an invocation request, paired with its result by id
//! - [`ToolResult`]: structured output or [`ToolError`]
//! - [`ToolValidator`]: pure argument validation against a schema
//! - [`ToolProvider`]: a backend that can discover and execute tools

pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult};
