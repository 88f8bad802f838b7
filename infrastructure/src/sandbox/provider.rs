//! Script tools exposed through [`ToolProvider`].

use std::time::Duration;

use async_trait::async_trait;
use kowalski_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};
use serde_json::json;
use tracing::info;

use super::error::SandboxError;
use super::runner::{ResourceLimits, ScriptRunner};
use super::workspace::ScriptWorkspace;
use crate::config::FileSandboxConfig;

pub const LIST_SCRIPTS: &str = "list_scripts";
pub const WRITE_SCRIPT: &str = "write_script";
pub const READ_SCRIPT: &str = "read_script";
pub const RUN_SCRIPT: &str = "run_script";

pub struct ScriptToolProvider {
    workspace: ScriptWorkspace,
    runner: ScriptRunner,
}

impl ScriptToolProvider {
    pub fn new(workspace: ScriptWorkspace, runner: ScriptRunner) -> Self {
        Self { workspace, runner }
    }

    /// Open the configured workspace and build the runner from `[sandbox]`.
    pub async fn from_config(config: &FileSandboxConfig) -> Result<Self, SandboxError> {
        let workspace = ScriptWorkspace::open(&config.workspace, &config.extension).await?;
        let runner = ScriptRunner::new(
            &config.interpreter,
            Duration::from_secs(config.default_timeout_secs),
            Duration::from_secs(config.max_timeout_secs),
        )
        .with_limits(ResourceLimits {
            cpu_secs: config.cpu_limit_secs,
            memory_mb: config.memory_limit_mb,
        });

        if which::which(runner.interpreter()).is_err() {
            tracing::warn!(
                interpreter = runner.interpreter(),
                "Interpreter not found on PATH; run_script will fail"
            );
        }
        info!(root = %workspace.root().display(), "Script workspace ready");
        Ok(Self::new(workspace, runner))
    }

    pub fn workspace(&self) -> &ScriptWorkspace {
        &self.workspace
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let ext = self.workspace.extension();
        vec![
            ToolDefinition::new(LIST_SCRIPTS, "List all scripts in the workspace."),
            ToolDefinition::new(
                WRITE_SCRIPT,
                format!(
                    "Create or overwrite a script in the workspace. The filename must end with {}.",
                    ext
                ),
            )
            .with_parameter(ToolParameter::new(
                "filename",
                format!("Plain file name ending in {}", ext),
                true,
            ))
            .with_parameter(ToolParameter::new("code", "Full source code of the script", true)),
            ToolDefinition::new(READ_SCRIPT, "Read the source of a script in the workspace.")
                .with_parameter(ToolParameter::new("filename", "Script file name", true)),
            ToolDefinition::new(
                RUN_SCRIPT,
                "Run a script from the workspace and return its stdout, stderr and exit code.",
            )
            .with_parameter(ToolParameter::new("filename", "Script file name", true))
            .with_parameter(
                ToolParameter::new(
                    "timeout",
                    "Wall-clock limit in seconds (default 30)",
                    false,
                )
                .with_type("integer"),
            ),
        ]
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
        let filename = || {
            call.require_string("filename")
                .map_err(ToolError::invalid_argument)
        };

        match call.tool_name.as_str() {
            LIST_SCRIPTS => {
                let scripts = self.workspace.list().await.map_err(|e| e.to_tool_error())?;
                Ok(json!({ "scripts": scripts }))
            }
            WRITE_SCRIPT => {
                let filename = filename()?;
                let code = call
                    .require_string("code")
                    .map_err(ToolError::invalid_argument)?;
                self.workspace
                    .write(filename, code)
                    .await
                    .map_err(|e| e.to_tool_error())?;
                info!(filename, bytes = code.len(), "Script written");
                Ok(json!({ "success": format!("Script {} written successfully.", filename) }))
            }
            READ_SCRIPT => {
                let filename = filename()?;
                let content = self
                    .workspace
                    .read(filename)
                    .await
                    .map_err(|e| e.to_tool_error())?;
                Ok(json!({ "filename": filename, "content": content }))
            }
            RUN_SCRIPT => {
                let filename = filename()?;
                let path = self
                    .workspace
                    .existing(filename)
                    .await
                    .map_err(|e| e.to_tool_error())?;
                let timeout = self.runner.effective_timeout(call.get_i64("timeout"));
                let output = self
                    .runner
                    .run(&path, self.workspace.root(), timeout)
                    .await
                    .map_err(|e| e.to_tool_error())?;
                info!(filename, exit_code = output.exit_code, "Script finished");
                serde_json::to_value(output).map_err(|e| ToolError::execution_failed(e.to_string()))
            }
            other => Err(ToolError::not_found(format!("Tool not found: {}", other))),
        }
    }
}

#[async_trait]
impl ToolProvider for ScriptToolProvider {
    fn id(&self) -> &str {
        "scripts"
    }

    fn display_name(&self) -> &str {
        "Script Sandbox"
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(self.definitions())
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.dispatch(call).await {
            Ok(output) => ToolResult::success(&call.tool_name, output),
            Err(error) => ToolResult::failure(&call.tool_name, error),
        }
    }
}
