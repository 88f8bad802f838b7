//! Tool provider abstraction
//!
//! A [`ToolProvider`] is a remote capability provider: something that can
//! advertise a set of tools and execute calls against them. The gateway's
//! registry talks to every backend service through this trait, and each
//! backend server exposes its local implementation through it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ToolRegistry                            │
//! │  (merged per agent run, routes strictly by tool name)       │
//! └─────────────────────────────────────────────────────────────┘
//!           │                    │                    │
//!           ▼                    ▼                    ▼
//!    ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!    │   scripts    │     │     data     │     │    search    │
//!    │ (remote RPC) │     │ (remote RPC) │     │ (remote RPC) │
//!    └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! New providers are added without touching dispatch logic.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolResult;

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not reachable
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Failed to discover tools from the provider
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The provider answered with something that is not a tool list
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Tool provider abstraction - a source of tools
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider (e.g., "scripts", "search")
    fn id(&self) -> &str;

    /// Display name for logs
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Discover the tools this provider currently offers
    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError>;

    /// Execute a tool call.
    ///
    /// Failures are reported inside the returned [`ToolResult`].
    async fn execute(&self, call: &ToolCall) -> ToolResult;

    /// Check if this provider currently offers a specific tool
    async fn has_tool(&self, tool_name: &str) -> bool {
        match self.discover_tools().await {
            Ok(tools) => tools.iter().any(|t| t.name == tool_name),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::value_objects::ToolError;

    struct MockProvider {
        id: String,
        tools: Vec<ToolDefinition>,
        available: bool,
    }

    impl MockProvider {
        fn new(id: &str, available: bool) -> Self {
            Self {
                id: id.to_string(),
                tools: Vec::new(),
                available,
            }
        }

        fn with_tool(mut self, name: &str) -> Self {
            self.tools
                .push(ToolDefinition::new(name, format!("Mock tool: {}", name)));
            self
        }
    }

    #[async_trait]
    impl ToolProvider for MockProvider {
        fn id(&self) -> &str {
            &self.id
        }

        async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
            if self.available {
                Ok(self.tools.clone())
            } else {
                Err(ProviderError::NotAvailable("mock offline".into()))
            }
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            if self.tools.iter().any(|t| t.name == call.tool_name) {
                ToolResult::success(&call.tool_name, serde_json::json!({"ok": true}))
            } else {
                ToolResult::failure(&call.tool_name, ToolError::not_found(&call.tool_name))
            }
        }
    }

    #[tokio::test]
    async fn test_provider_discovery() {
        let provider = MockProvider::new("mock", true)
            .with_tool("get_links")
            .with_tool("search");

        let tools = provider.discover_tools().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(provider.display_name(), "mock");
    }

    #[tokio::test]
    async fn test_provider_not_available() {
        let provider = MockProvider::new("mock", false).with_tool("search");

        assert!(provider.discover_tools().await.is_err());
        assert!(!provider.has_tool("search").await);
    }

    #[tokio::test]
    async fn test_provider_execute() {
        let provider = MockProvider::new("mock", true).with_tool("search");

        let ok = provider.execute(&ToolCall::new("search")).await;
        assert!(ok.is_success());

        let missing = provider.execute(&ToolCall::new("other")).await;
        assert_eq!(missing.error().unwrap().code, "NOT_FOUND");
    }
}
