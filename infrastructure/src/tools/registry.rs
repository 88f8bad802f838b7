//! Tool Registry
//!
//! The [`ToolRegistry`] aggregates the tools of several providers and
//! implements [`ToolExecutorPort`].
//!
//! # Discovery Process
//!
//! 1. Every provider's `discover_tools()` runs concurrently
//! 2. A provider that fails is skipped with a warning
//! 3. Tools are merged in provider order; a name advertised twice aborts
//!    discovery with [`RegistryError::NameCollision`]
//! 4. A unified `ToolSpec` is built for the agent
//!
//! # Usage
//!
//! ```ignore
//! let registry = ToolRegistry::discover(vec![scripts, search]).await?;
//! let call = ToolCall::new("read_script").with_arg("filename", "t.py");
//! let result = registry.execute(&call).await;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use kowalski_application::ports::tool_executor::{
    RegistryError, ToolDiscoveryPort, ToolExecutorPort,
};
use kowalski_domain::tool::{
    entities::{ToolCall, ToolSpec},
    provider::ToolProvider,
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
use tracing::{debug, warn};

/// Merged catalog of tools plus the provider that owns each name
pub struct ToolRegistry {
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> index into `providers`
    routes: HashMap<String, usize>,
    tool_spec: ToolSpec,
}

impl ToolRegistry {
    /// Ask every provider for its tools and merge the answers.
    pub async fn discover(providers: Vec<Arc<dyn ToolProvider>>) -> Result<Self, RegistryError> {
        let answers = join_all(providers.iter().map(|p| p.discover_tools())).await;

        let mut routes: HashMap<String, usize> = HashMap::new();
        let mut tool_spec = ToolSpec::new();

        for (index, answer) in answers.into_iter().enumerate() {
            let provider = &providers[index];
            let tools = match answer {
                Ok(tools) => tools,
                Err(e) => {
                    warn!(
                        provider = provider.id(),
                        error = %e,
                        "Failed to discover tools from provider, skipping"
                    );
                    continue;
                }
            };

            for tool in tools {
                if let Some(&owner) = routes.get(&tool.name) {
                    return Err(RegistryError::NameCollision {
                        tool: tool.name,
                        first: providers[owner].id().to_string(),
                        second: provider.id().to_string(),
                    });
                }
                debug!(tool = %tool.name, provider = provider.id(), "Registered tool");
                routes.insert(tool.name.clone(), index);
                tool_spec = tool_spec.register(tool);
            }
        }

        Ok(Self {
            providers,
            routes,
            tool_spec,
        })
    }

    /// Identifier of the provider serving `tool_name`
    pub fn provider_for(&self, tool_name: &str) -> Option<&str> {
        self.routes
            .get(tool_name)
            .map(|&index| self.providers[index].id())
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let (Some(&index), Some(definition)) = (
            self.routes.get(&call.tool_name),
            self.tool_spec.get(&call.tool_name),
        ) else {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::not_found(format!("Tool not found: {}", call.tool_name)),
            );
        };

        if let Err(message) = DefaultToolValidator.validate(call, definition) {
            return ToolResult::failure(&call.tool_name, ToolError::invalid_argument(message));
        }

        let provider = &self.providers[index];
        debug!(tool = %call.tool_name, provider = provider.id(), "Dispatching tool call");
        provider.execute(call).await
    }
}

/// Builds a fresh [`ToolRegistry`] from a fixed set of providers on every
/// call, so the catalog always reflects what the backends advertise now.
pub struct ProviderSetDiscovery {
    providers: Vec<Arc<dyn ToolProvider>>,
}

impl ProviderSetDiscovery {
    pub fn new(providers: Vec<Arc<dyn ToolProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ToolDiscoveryPort for ProviderSetDiscovery {
    async fn discover(&self) -> Result<Arc<dyn ToolExecutorPort>, RegistryError> {
        let registry = ToolRegistry::discover(self.providers.clone()).await?;
        Ok(Arc::new(registry))
    }
}
