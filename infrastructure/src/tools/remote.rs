//! Remote tool provider speaking the JSON-RPC tool protocol over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use kowalski_domain::tool::{
    entities::{ToolCall, ToolDefinition},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};
use serde_json::Value;
use tracing::debug;

use kowalski_domain::protocol::{
    CallToolParams, CallToolResult, INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, RpcError,
};

enum CallFailure {
    Transport(reqwest::Error),
    Rpc(RpcError),
    Decode(String),
}

/// A backend service reached at one JSON-RPC endpoint
pub struct RemoteToolProvider {
    id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteToolProvider {
    /// Every request to this backend is bounded by `timeout`.
    pub fn new(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let id = id.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotAvailable(format!("{}: {}", id, e)))?;
        Ok(Self {
            id,
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rpc(&self, request: JsonRpcRequest) -> Result<Value, CallFailure> {
        debug!(provider = %self.id, method = %request.method, "Sending tool RPC");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(CallFailure::Transport)?;

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| CallFailure::Decode(e.to_string()))?;
        body.into_result().map_err(CallFailure::Rpc)
    }
}

#[async_trait]
impl ToolProvider for RemoteToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        let result = self
            .rpc(JsonRpcRequest::list_tools())
            .await
            .map_err(|failure| match failure {
                CallFailure::Transport(e) if e.is_connect() || e.is_timeout() => {
                    ProviderError::NotAvailable(format!("{}: {}", self.endpoint, e))
                }
                CallFailure::Transport(e) => ProviderError::DiscoveryFailed(e.to_string()),
                CallFailure::Rpc(e) => ProviderError::Protocol(e.to_string()),
                CallFailure::Decode(e) => ProviderError::Protocol(e),
            })?;

        let list: ListToolsResult =
            serde_json::from_value(result).map_err(|e| ProviderError::Protocol(e.to_string()))?;
        Ok(list.tools)
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let params = CallToolParams {
            name: call.tool_name.clone(),
            arguments: call
                .arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        let error = match self.rpc(JsonRpcRequest::call_tool(&params)).await {
            Ok(result) => {
                return match serde_json::from_value::<CallToolResult>(result) {
                    Ok(answer) => {
                        ToolResult::from_payload(&call.tool_name, answer.content, answer.is_error)
                    }
                    Err(e) => ToolResult::failure(
                        &call.tool_name,
                        ToolError::execution_failed(format!("Malformed tool result: {}", e)),
                    ),
                };
            }
            Err(CallFailure::Transport(e)) if e.is_timeout() => ToolError::timeout(format!(
                "{} did not answer in time",
                self.id
            )),
            Err(CallFailure::Transport(e)) if e.is_connect() => {
                ToolError::unavailable(format!("{} is unreachable: {}", self.id, e))
            }
            Err(CallFailure::Transport(e)) => ToolError::execution_failed(e.to_string()),
            Err(CallFailure::Rpc(e)) if e.code == INVALID_PARAMS => {
                ToolError::invalid_argument(e.message)
            }
            Err(CallFailure::Rpc(e)) => ToolError::execution_failed(e.to_string()),
            Err(CallFailure::Decode(e)) => ToolError::execution_failed(e),
        };
        ToolResult::failure(&call.tool_name, error)
    }
}
