//! Tool Executor port
//!
//! Defines the interface for discovering and executing backend tools.

use async_trait::async_trait;
use kowalski_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};
use std::sync::Arc;
use thiserror::Error;

/// Port for tool execution
///
/// A tool executor is a catalog plus a dispatcher: it routes each call to the
/// backend that advertised the tool.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Execute a tool call. Failures come back as failed results.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

/// Errors that abort tool discovery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool '{tool}' is advertised by both '{first}' and '{second}'")]
    NameCollision {
        tool: String,
        first: String,
        second: String,
    },
}

/// Port for building a fresh tool executor.
///
/// Called once per agent run so the catalog always reflects what the
/// backends advertise right now.
#[async_trait]
pub trait ToolDiscoveryPort: Send + Sync {
    async fn discover(&self) -> Result<Arc<dyn ToolExecutorPort>, RegistryError>;
}
